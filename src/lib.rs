//! Signal Relay - forwards charting-service webhook alerts to Telegram
//!
//! This library provides the building blocks of the relay: the inbound body
//! pipeline, the signal formatter, the Telegram notifier, and the HTTP routes
//! that compose them.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod fixtures;
pub mod formatting;
pub mod intake;
pub mod internal_metrics;
pub mod logger;
pub mod notification;
pub mod server;
pub mod signal;

// Re-export core types for convenience
pub use crate::core::*;
