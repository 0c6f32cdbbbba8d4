//! Typed view over an inbound signal payload.
//!
//! The `action` field selects one of the recognized variants. Field coercion
//! failures are reported as [`FormatError`] so the formatter can degrade to
//! its fallback message.

use crate::core::SignalPayload;
use serde_json::Value;
use thiserror::Error;

/// Symbol rendered when the payload carries none.
pub const UNKNOWN_SYMBOL: &str = "Unknown";
/// Retracement label rendered when the payload carries none.
pub const MISSING_LABEL: &str = "N/A";
/// The `result` value that marks a winning exit.
pub const PROFIT_RESULT: &str = "PROFIT";

#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("field '{field}' is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("entry price is zero, TP/SL percentages are undefined")]
    ZeroEntryPrice,
}

/// A new position opened at a retracement level.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySignal {
    pub symbol: String,
    pub fib_type: String,
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl EntrySignal {
    /// Distance from entry to take-profit, in percent of the entry price.
    pub fn take_profit_pct(&self) -> f64 {
        (self.take_profit - self.price) / self.price * 100.0
    }

    /// Distance from entry to stop-loss, in percent of the entry price.
    pub fn stop_loss_pct(&self) -> f64 {
        (self.stop_loss - self.price) / self.price * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Profit,
    Loss,
}

impl Outcome {
    fn from_result(result: &str) -> Self {
        if result == PROFIT_RESULT {
            Outcome::Profit
        } else {
            Outcome::Loss
        }
    }
}

/// A closed position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitSignal {
    pub symbol: String,
    pub outcome: Outcome,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Entry(EntrySignal),
    Exit(ExitSignal),
    /// Missing or unrecognized `action`; the payload is rendered verbatim.
    Unrecognized,
}

impl Signal {
    /// Reads the discriminator and coerces the fields of the matching variant.
    pub fn from_payload(payload: &SignalPayload) -> Result<Self, FormatError> {
        let symbol = text_field(payload, "symbol", UNKNOWN_SYMBOL);

        match payload.get("action").and_then(Value::as_str) {
            Some("ENTRY") => {
                let price = coerce_f64(payload, "price")?;
                let take_profit = coerce_f64(payload, "tp")?;
                let stop_loss = coerce_f64(payload, "sl")?;
                if price == 0.0 {
                    return Err(FormatError::ZeroEntryPrice);
                }
                Ok(Signal::Entry(EntrySignal {
                    symbol,
                    fib_type: text_field(payload, "fib_type", MISSING_LABEL),
                    price,
                    take_profit,
                    stop_loss,
                }))
            }
            Some("EXIT") => Ok(Signal::Exit(ExitSignal {
                symbol,
                exit_price: coerce_f64(payload, "exit_price")?,
                entry_price: coerce_f64(payload, "entry_price")?,
                outcome: Outcome::from_result(&text_field(payload, "result", "")),
                profit_rate: coerce_f64(payload, "profit_rate")?,
            })),
            _ => Ok(Signal::Unrecognized),
        }
    }
}

/// Coerces a payload field to `f64`. A missing field reads as `0.0`.
///
/// Numbers, booleans and numeric strings are accepted; anything else is an
/// [`FormatError::InvalidNumber`].
pub fn coerce_f64(payload: &SignalPayload, field: &'static str) -> Result<f64, FormatError> {
    let invalid = |value: &Value| FormatError::InvalidNumber {
        field,
        value: value.to_string(),
    };

    match payload.get(field) {
        None => Ok(0.0),
        Some(value @ Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(value)),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(value @ Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid(value)),
        Some(other) => Err(invalid(other)),
    }
}

fn text_field(payload: &SignalPayload, field: &str, default: &str) -> String {
    match payload.get(field) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
