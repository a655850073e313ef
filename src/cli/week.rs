use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::calendar::render::{render_week, templates};
use crate::calendar::{CalendarSession, Persistence};
use crate::client::AppointmentsClient;

pub async fn run(week: Option<NaiveDate>, api_url: &str) -> Result<()> {
    let client = AppointmentsClient::new(api_url)?;
    let appointments = client.load().await?;

    let today = Local::now().date_naive();
    let session = CalendarSession::new(week.unwrap_or(today), appointments);
    println!("{}", render_week(&templates(), &session.grid())?);
    Ok(())
}
