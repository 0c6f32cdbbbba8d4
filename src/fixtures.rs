//! Canned payloads and messages used by the diagnostic routes.

use crate::core::SignalPayload;
use chrono::NaiveDateTime;
use serde_json::json;

/// A sample ENTRY alert as sent by the charting service.
pub fn sample_entry() -> SignalPayload {
    SignalPayload::from_iter([
        ("action".to_string(), json!("ENTRY")),
        ("symbol".to_string(), json!("BTCUSDT")),
        ("price".to_string(), json!(45000.0)),
        ("tp".to_string(), json!(46200.0)),
        ("sl".to_string(), json!(44100.0)),
        ("fib_type".to_string(), json!("0.382")),
    ])
}

/// A sample winning EXIT alert closing [`sample_entry`].
pub fn sample_exit() -> SignalPayload {
    SignalPayload::from_iter([
        ("action".to_string(), json!("EXIT")),
        ("symbol".to_string(), json!("BTCUSDT")),
        ("exit_price".to_string(), json!(46200.0)),
        ("entry_price".to_string(), json!(45000.0)),
        ("result".to_string(), json!("PROFIT")),
        ("profit_rate".to_string(), json!(2.67)),
    ])
}

pub fn connectivity_message(now: NaiveDateTime) -> String {
    format!(
        "🧪 <b>Telegram connectivity test</b>\n\
         \n\
         ✅ Webhook server is running\n\
         ⏰ Time: {}\n\
         🤖 Status: OK\n\
         \n\
         If you can read this, the relay is configured correctly! 🎉",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::TelegramHtmlFormatter;
    use crate::signal::{Outcome, Signal};
    use chrono::NaiveDate;

    #[test]
    fn test_samples_parse_as_signals() {
        assert!(matches!(
            Signal::from_payload(&sample_entry()),
            Ok(Signal::Entry(_))
        ));
        match Signal::from_payload(&sample_exit()) {
            Ok(Signal::Exit(exit)) => assert_eq!(exit.outcome, Outcome::Profit),
            other => panic!("expected exit signal, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_entry_renders() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let text = TelegramHtmlFormatter.format_at(&sample_entry(), at);
        assert!(text.contains("🎯 Take Profit: $46,200 (+2.7%)"));

        let message = connectivity_message(at);
        assert!(message.contains("⏰ Time: 2025-01-02 03:04:05"));
    }
}
