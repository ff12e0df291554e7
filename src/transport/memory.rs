use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::message::Message;
use crate::transport::Transport;
use crate::utils::{Error, Result};

/// Keeps published messages in memory, grouped by topic.
///
/// Every call to `publish` is counted, including failed ones.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    topics: Mutex<HashMap<String, Vec<Message>>>,
    calls: AtomicUsize,
    failure: Mutex<Option<String>>,
    latency: Option<Duration>,
    // when set, only these topics accept messages
    known_topics: Option<HashSet<String>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every publish by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Restricts publishing to the given topics; others fail with
    /// [`Error::TopicNotFound`].
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_topics = Some(topics.into_iter().map(Into::into).collect());
        self
    }

    /// Makes every following publish fail with `Error::Transport(reason)`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason.into());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Number of publish calls seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn messages(&self, topic: &str) -> Vec<Message> {
        self.topics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of stored messages across topics.
    pub fn len(&self) -> usize {
        self.topics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(&self, topic: &str, message: &Message) -> Result<()> {
        if let Some(reason) = self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(Error::Transport(reason));
        }

        if let Some(known) = &self.known_topics {
            if !known.contains(topic) {
                return Err(Error::TopicNotFound(topic.to_string()));
            }
        }

        self.topics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(topic.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }
}

impl Transport for InMemoryTransport {
    async fn publish(&self, topic: &str, message: &Message) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.store(topic, message)
    }
}
