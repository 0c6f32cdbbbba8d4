// src/formatting.rs

use crate::core::{MessageFormatter, SignalPayload};
use crate::signal::{EntrySignal, ExitSignal, FormatError, Outcome, Signal};
use chrono::{Local, NaiveDateTime};

/// A formatter producing Telegram HTML messages for trading signals.
///
/// User-supplied text is escaped so the rendered message is always valid
/// HTML for the `HTML` parse mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelegramHtmlFormatter;

impl TelegramHtmlFormatter {
    /// Formats `payload` using `now` as the message timestamp.
    pub fn format_at(&self, payload: &SignalPayload, now: NaiveDateTime) -> String {
        match Signal::from_payload(payload) {
            Ok(Signal::Entry(entry)) => self.format_entry(&entry, now),
            Ok(Signal::Exit(exit)) => self.format_exit(&exit, now),
            Ok(Signal::Unrecognized) => self.format_generic(payload, now),
            Err(err) => self.format_fallback(payload, &err, now),
        }
    }

    fn format_entry(&self, entry: &EntrySignal, now: NaiveDateTime) -> String {
        format!(
            "🚀 <b>ENTRY SIGNAL</b>\n\
             \n\
             📊 Symbol: <b>{symbol}</b>\n\
             📐 Fib Level: {fib}\n\
             \n\
             💰 Entry: ${price}\n\
             🎯 Take Profit: ${tp} ({tp_pct:+.1}%)\n\
             🛑 Stop Loss: ${sl} ({sl_pct:.1}%)\n\
             \n\
             ⏰ {time}",
            symbol = escape_html(&entry.symbol),
            fib = escape_html(&entry.fib_type),
            price = group_thousands(entry.price),
            tp = group_thousands(entry.take_profit),
            tp_pct = entry.take_profit_pct(),
            sl = group_thousands(entry.stop_loss),
            sl_pct = entry.stop_loss_pct(),
            time = now.format("%H:%M:%S"),
        )
    }

    fn format_exit(&self, exit: &ExitSignal, now: NaiveDateTime) -> String {
        let (marker, label) = match exit.outcome {
            Outcome::Profit => ("✅", "PROFIT"),
            Outcome::Loss => ("❌", "LOSS"),
        };

        format!(
            "{marker} <b>EXIT SIGNAL - {label}</b>\n\
             \n\
             📊 Symbol: <b>{symbol}</b>\n\
             \n\
             📥 Entry: ${entry}\n\
             📤 Exit: ${exit_price}\n\
             💵 P/L: {rate:+.2}%\n\
             \n\
             ⏰ {time}",
            symbol = escape_html(&exit.symbol),
            entry = group_thousands(exit.entry_price),
            exit_price = group_thousands(exit.exit_price),
            rate = exit.profit_rate,
            time = now.format("%H:%M:%S"),
        )
    }

    fn format_generic(&self, payload: &SignalPayload, now: NaiveDateTime) -> String {
        format!(
            "📊 <b>TradingView Signal</b>\n\
             \n\
             ⏰ Time: {time}\n\
             📈 Data:\n\
             <pre>{dump}</pre>",
            time = now.format("%H:%M:%S"),
            dump = escape_html(&pretty_json(payload)),
        )
    }

    fn format_fallback(&self, payload: &SignalPayload, err: &FormatError, now: NaiveDateTime) -> String {
        format!(
            "⚠️ <b>Signal received (formatting failed)</b>\n\
             \n\
             ⏰ Time: {time}\n\
             ❗ Error: {err}\n\
             \n\
             📈 Raw data:\n\
             <pre>{dump}</pre>",
            time = now.format("%Y-%m-%d %H:%M:%S"),
            err = escape_html(&err.to_string()),
            dump = escape_html(&pretty_json(payload)),
        )
    }
}

impl MessageFormatter for TelegramHtmlFormatter {
    fn format(&self, payload: &SignalPayload) -> String {
        self.format_at(payload, Local::now().naive_local())
    }
}

/// Renders `value` rounded to an integer with `,` thousands separators.
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 && digits != "0" {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn pretty_json(payload: &SignalPayload) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| format!("{:?}", payload))
}
