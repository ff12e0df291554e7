use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// State of a single virtual user.
#[derive(Debug, Default)]
pub struct VuState {
    pub vu_id: u64,
    iteration: AtomicU64,
    pub tags: BTreeMap<String, String>,
    pub stats: PublishStats,
}

impl VuState {
    pub fn new(vu_id: u64) -> Self {
        Self {
            vu_id,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn iteration(&self) -> u64 {
        self.iteration.load(Ordering::Relaxed)
    }

    /// Moves to the next iteration and returns its number.
    pub fn next_iteration(&self) -> u64 {
        self.iteration.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Publish counters kept per virtual user.
#[derive(Debug, Default)]
pub struct PublishStats {
    messages_sent: AtomicU64,
    publish_errors: AtomicU64,
}

impl PublishStats {
    pub fn record_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.publish_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn publish_errors(&self) -> u64 {
        self.publish_errors.load(Ordering::Relaxed)
    }
}
