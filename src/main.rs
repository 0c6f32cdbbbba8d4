//! Signal Relay - TradingView to Telegram webhook relay
//!
//! Receives alert webhooks over HTTP, formats them, and forwards them to a
//! Telegram chat through the bot API.

use anyhow::Result;
use clap::Parser;
use signal_relay::{app::App, cli::Cli, config::Config, logger::setup_logger};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::load(&cli).unwrap_or_else(|err| {
        // Startup aborts below either way.
        setup_logger("error").ok();
        error!("Failed to load configuration: {:#}", err);
        std::process::exit(1);
    });

    setup_logger(&config.log_level)?;

    info!("Signal relay starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Listen Address: {}:{}", config.server.host, config.server.port);
    info!("Telegram API: {}", config.telegram.api_base_url);
    info!("Telegram Chat ID: {}", config.telegram.chat_id);
    info!("Telegram Timeout: {}s", config.telegram.timeout_seconds);
    info!("Parse Mode: {}", config.telegram.parse_mode);
    info!(
        "Metrics: {}",
        if config.metrics.enabled { "Enabled" } else { "Disabled" }
    );
    info!("-------------------------------------------------------");

    for field in config.placeholder_credentials() {
        warn!(
            "{} is still set to its placeholder value; notifications will fail until it is configured.",
            field
        );
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let app = App::builder(config)
        .shutdown_signal(shutdown_rx)
        .build()
        .await?;
    info!("Listening on http://{}", app.local_addr());

    let server = tokio::spawn(app.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    let _ = shutdown_tx.send(true);

    match server.await {
        Ok(result) => result?,
        Err(e) => error!("Server task panicked: {:?}", e),
    }

    info!("Exiting.");
    Ok(())
}
