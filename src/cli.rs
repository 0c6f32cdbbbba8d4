//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration from the TOML file and environment variables, taking
//! precedence over both.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Relays TradingView webhook alerts to a Telegram chat.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, value_name = "ADDR")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Logging level (e.g. "debug", "info,tower_http=debug").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Serve Prometheus metrics on `/metrics`.
    #[arg(long)]
    pub metrics: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        let mut server = Dict::new();
        if let Some(host) = &self.host {
            server.insert("host".into(), Value::from(host.clone()));
        }
        if let Some(port) = self.port {
            server.insert("port".into(), Value::from(port));
        }
        if !server.is_empty() {
            dict.insert("server".into(), Value::from(server));
        }

        // A bare flag can only switch metrics on; absence leaves lower layers alone.
        if self.metrics {
            let mut metrics = Dict::new();
            metrics.insert("enabled".into(), Value::from(true));
            dict.insert("metrics".into(), Value::from(metrics));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
