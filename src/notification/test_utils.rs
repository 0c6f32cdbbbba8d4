use crate::core::Notifier;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Notifier that records every message and reports a configurable outcome.
#[derive(Clone, Debug)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    deliver: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new(deliver: bool) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            deliver: Arc::new(AtomicBool::new(deliver)),
        }
    }

    /// Changes the outcome reported for subsequent messages.
    pub fn set_deliver(&self, deliver: bool) {
        self.deliver.store(deliver, Ordering::SeqCst);
    }

    /// Returns a copy of every message passed to `notify`, in order.
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_message(&self) -> Option<String> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> bool {
        self.sent.lock().unwrap().push(text.to_string());
        self.deliver.load(Ordering::SeqCst)
    }
}
