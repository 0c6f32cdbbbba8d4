//! Core domain types and service traits for the relay
//!
//! This module defines the payload shape that flows through a single request
//! and the trait contracts the HTTP layer composes: a formatter that turns a
//! payload into display text, and a notifier that delivers that text.

use async_trait::async_trait;
use serde_json::{Map, Value};

/// An inbound alert payload: an open mapping from string keys to JSON values.
///
/// Payloads are transient and live only for the duration of one request.
pub type SignalPayload = Map<String, Value>;

/// Key under which an unparseable request body is wrapped.
pub const RAW_MESSAGE_KEY: &str = "raw_message";

/// Converts a signal payload into a human-readable message.
///
/// Implementations are total: any problem with the payload degrades to a
/// fallback message instead of an error.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, payload: &SignalPayload) -> String;
}

/// Delivers a formatted message to its destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text`, returning `true` only if the destination accepted it.
    ///
    /// Failures are logged by the implementation and never propagated.
    async fn notify(&self, text: &str) -> bool;
}
