use anyhow::Result;
use chrono::Local;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

mod config;
mod models;
mod monitor;
mod notify;
mod parsers;
mod scrapers;
mod utils;

use crate::config::Config;
use crate::monitor::{run_check, CheckOutcome};
use crate::notify::TelegramClient;
use crate::scrapers::NikeScraper;

/// Exit status for a missing or invalid configuration.
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("price_watch=info".parse()?),
        )
        .init();

    info!("Starting Price Watch");

    let config = match Config::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };

    let client = utils::http::create_client(&config.user_agent)?;
    let renderer = NikeScraper::new(config.clone(), client.clone());
    let notifier = TelegramClient::new(
        client,
        config.telegram.api_url.clone(),
        config.telegram.bot_token.clone(),
    );

    let Some(every) = config.check_interval_seconds else {
        return match run_check(&config, &renderer, &notifier).await {
            Ok(outcome) => {
                log_outcome(&outcome);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                error!("Check for '{}' failed: {:#}", config.query, e);
                Err(e)
            }
        };
    };

    let mut interval = interval(Duration::from_secs(every));

    loop {
        interval.tick().await;

        info!("--- Starting new check at {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));

        match run_check(&config, &renderer, &notifier).await {
            Ok(outcome) => log_outcome(&outcome),
            Err(e) => error!("Check for '{}' failed: {:#}", config.query, e),
        }

        info!("Check completed, waiting {} seconds", every);
    }
}

fn log_outcome(outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::NoResults => info!("No priced products found"),
        CheckOutcome::Checked { best, below_threshold: true } => {
            info!("Price alert sent for {} at S/ {:.2}", best.name, best.price)
        }
        CheckOutcome::Checked { best, below_threshold: false } => {
            info!("Lowest price S/ {:.2} is above threshold", best.price)
        }
    }
}
