use anyhow::Result;

use crate::calendar::render::{render_summary, templates};
use crate::calendar::{Persistence, sessions_summary};
use crate::client::AppointmentsClient;

pub async fn run(api_url: &str) -> Result<()> {
    let client = AppointmentsClient::new(api_url)?;
    let appointments = client.load().await?;

    println!(
        "{}",
        render_summary(&templates(), &sessions_summary(&appointments))?
    );
    Ok(())
}
