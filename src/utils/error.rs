//! The `error` module defines the error type returned by every fallible
//! operation in `pubsub_adapter`.
//!
//! Setup errors (`Config`, `Construction`) are returned like any other error;
//! deciding whether they abort the run is left to the caller.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The publisher configuration could not be decoded.
    #[error("unable to read publisher config: {0}")]
    Config(String),

    /// The underlying Pub/Sub client could not be built.
    #[error("unable to init publisher: {0}")]
    Construction(String),

    /// The execution context carries no virtual-user state.
    #[error("execution state is unavailable")]
    ContextUnavailable,

    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("attribute key `{0}` is reserved")]
    ReservedAttribute(String),

    #[error("topic `{0}` does not exist")]
    TopicNotFound(String),

    #[error("publish to `{topic}` timed out after {timeout:?}")]
    Timeout { topic: String, timeout: Duration },

    #[error("publish to `{0}` was cancelled")]
    Cancelled(String),

    /// The underlying client failed to deliver the message.
    #[error("unable to publish message: {0}")]
    Transport(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Whether the error belongs to the setup phase rather than a single
    /// publish call.
    pub fn is_setup(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Construction(_))
    }
}
