//! The `client` module exposes the publisher handle used by load-test code.
//!
//! [`create_publisher`] resolves a dynamic option map and connects to Google
//! Cloud Pub/Sub. [`Publisher::new`] builds a handle over any [`Transport`],
//! which is how dry runs and tests use the in-memory transport.
//!
//! [`Transport`]: crate::transport::Transport

pub mod publisher;

pub use publisher::Publisher;

use serde_json::{Map, Value};

use crate::config::PublisherSettings;
use crate::transport::GcpTransport;
use crate::utils::Result;

/// Decodes `options` and connects a publisher to Pub/Sub.
///
/// Both decoding and connecting happen here, before the first publish.
/// Failures are setup errors (see [`crate::utils::Error::is_setup`]); the
/// caller decides whether they abort the run.
///
/// No tracing subscriber is installed. The `debug` and `trace` options only
/// enable the per-publish events; the application picks the subscriber,
/// e.g. with [`crate::utils::logging::init`] at
/// [`PublisherSettings::log_level`].
pub async fn create_publisher(options: &Map<String, Value>) -> Result<Publisher<GcpTransport>> {
    let settings = PublisherSettings::from_map(options)?;
    Publisher::connect(settings).await
}

impl Publisher<GcpTransport> {
    pub async fn connect(settings: PublisherSettings) -> Result<Self> {
        let transport = GcpTransport::connect(&settings).await?;
        Ok(Self::new(settings, transport))
    }
}
