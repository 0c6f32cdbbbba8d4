//! Outbound delivery of formatted signal messages.
//!
//! The HTTP layer depends only on the [`Notifier`](crate::core::Notifier)
//! trait. [`telegram::TelegramNotifier`] is the production implementation;
//! `test_utils` provides a recording stand-in for tests.
pub mod telegram;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
