use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::api_url;

pub mod calendar;
pub mod serve;
pub mod summary;
pub mod week;

#[derive(Subcommand)]
enum Command {
    /// Run the appointments API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Open the interactive weekly calendar
    Calendar {
        /// Show the week containing this date (YYYY-MM-DD) first
        #[arg(long)]
        week: Option<NaiveDate>,
    },
    /// Print one week of the calendar
    Week {
        /// Any date of the week to print (YYYY-MM-DD), defaults to today
        #[arg(long)]
        week: Option<NaiveDate>,
    },
    /// Print the number of present sessions per person
    Summary {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Log to stderr for the client-side commands so output stays readable.
fn init_client_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Calendar { week }) => {
            init_client_tracing();
            calendar::run(week, &api_url()).await?;
        }
        Some(Command::Week { week }) => {
            init_client_tracing();
            week::run(week, &api_url()).await?;
        }
        Some(Command::Summary {}) => {
            init_client_tracing();
            summary::run(&api_url()).await?;
        }
        None => {}
    }

    Ok(())
}
