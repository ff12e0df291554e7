use std::collections::HashMap;
use std::future::Future;

use tokio::sync::Mutex;

use crate::utils::Result;

/// Per-topic handles, opened on first use.
///
/// The lock only guards the map. Opening a handle runs unlocked, so a slow
/// first publish to one topic never holds up publishes to cached topics.
#[derive(Debug)]
pub(crate) struct TopicCache<P> {
    entries: Mutex<HashMap<String, P>>,
}

impl<P: Clone> TopicCache<P> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) async fn get(&self, topic: &str) -> Option<P> {
        self.entries.lock().await.get(topic).cloned()
    }

    /// Returns the cached handle for `topic`, opening it with `open` if there
    /// is none.
    ///
    /// When two callers open the same topic concurrently the first insert
    /// wins; the losing handle is returned as the second value so the caller
    /// can release it.
    pub(crate) async fn get_or_open<F, Fut>(&self, topic: &str, open: F) -> Result<(P, Option<P>)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        if let Some(handle) = self.get(topic).await {
            return Ok((handle, None));
        }

        let opened = open().await?;

        let mut entries = self.entries.lock().await;
        match entries.get(topic) {
            Some(existing) => Ok((existing.clone(), Some(opened))),
            None => {
                entries.insert(topic.to_string(), opened.clone());
                Ok((opened, None))
            }
        }
    }

    pub(crate) async fn drain(&self) -> Vec<(String, P)> {
        self.entries.lock().await.drain().collect()
    }
}
