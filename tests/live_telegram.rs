//! Sends real messages through the Telegram bot API.
//!
//! Requires `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` (or a `.env` file).
//! Run with `cargo test --features live-tests --test live_telegram`.

#![cfg(feature = "live-tests")]

use anyhow::Result;
use signal_relay::{
    cli::Cli, config::Config, fixtures, formatting::TelegramHtmlFormatter,
    notification::telegram::TelegramNotifier, MessageFormatter,
};

#[tokio::test]
async fn live_sample_signals_are_delivered() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::load(&Cli::default())?;
    assert!(
        config.placeholder_credentials().is_empty(),
        "Telegram credentials must be configured for live tests"
    );

    let notifier = TelegramNotifier::new(&config.telegram)?;
    for payload in [fixtures::sample_entry(), fixtures::sample_exit()] {
        notifier
            .send_message(&TelegramHtmlFormatter.format(&payload))
            .await?;
    }
    Ok(())
}
