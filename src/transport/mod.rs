//! The `transport` module is the seam between the publisher handle and the
//! service that actually stores messages.
//!
//! [`GcpTransport`] talks to Google Cloud Pub/Sub (or its emulator).
//! [`InMemoryTransport`] keeps messages in memory and is used for dry runs
//! and tests.

mod cache;
pub mod gcp;
pub mod memory;

pub use gcp::GcpTransport;
pub use memory::InMemoryTransport;

use std::future::Future;

use crate::message::Message;
use crate::utils::Result;

/// Delivers messages to named topics.
///
/// `publish` resolves once the service has acknowledged the message or the
/// delivery failed. Implementations must be safe to share between tasks.
pub trait Transport: Send + Sync {
    fn publish(&self, topic: &str, message: &Message) -> impl Future<Output = Result<()>> + Send;

    /// Flushes and releases resources held for published topics.
    fn shutdown(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}
