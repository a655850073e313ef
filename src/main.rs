use anyhow::Result;
use practice_calendar::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
