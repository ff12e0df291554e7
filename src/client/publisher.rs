use std::collections::HashMap;

use tracing::{debug, error, trace};

use crate::config::PublisherSettings;
use crate::context::ExecutionContext;
use crate::message::Message;
use crate::transport::Transport;
use crate::utils::{Error, Result};

/// A live publisher bound to resolved settings.
///
/// The handle is meant to be created once and shared (e.g. behind an `Arc`)
/// by every virtual user. Each publish call performs exactly one transport
/// call and resolves when the service acknowledged the message, the publish
/// timeout elapsed or the context was cancelled. Nothing is retried.
#[derive(Debug)]
pub struct Publisher<T: Transport> {
    settings: PublisherSettings,
    transport: T,
}

impl<T: Transport> Publisher<T> {
    pub fn new(settings: PublisherSettings, transport: T) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &PublisherSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Publishes `payload` to `topic`.
    pub async fn publish(&self, ctx: &ExecutionContext, topic: &str, payload: &str) -> Result<()> {
        self.dispatch(ctx, topic, Ok(Message::new(payload))).await
    }

    /// Publishes `payload` to `topic` with `attributes` set as message
    /// metadata.
    pub async fn publish_with_attributes(
        &self,
        ctx: &ExecutionContext,
        topic: &str,
        payload: &str,
        attributes: HashMap<String, String>,
    ) -> Result<()> {
        self.dispatch(ctx, topic, Message::with_attributes(payload, attributes))
            .await
    }

    /// Flushes and releases the transport.
    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
    }

    async fn dispatch(
        &self,
        ctx: &ExecutionContext,
        topic: &str,
        message: Result<Message>,
    ) -> Result<()> {
        let Some(state) = ctx.state() else {
            let err = Error::ContextUnavailable;
            error!(topic, error = %err, "cannot determine state");
            return Err(err);
        };

        let result = self.send(ctx, topic, message).await;

        // reporting never changes the outcome
        match &result {
            Ok(()) => state.stats.record_sent(),
            Err(err) => {
                state.stats.record_error();
                error!(
                    vu = state.vu_id,
                    iteration = state.iteration(),
                    topic,
                    error = %err,
                    "unable to publish message"
                );
            }
        }

        result
    }

    async fn send(
        &self,
        ctx: &ExecutionContext,
        topic: &str,
        message: Result<Message>,
    ) -> Result<()> {
        if topic.is_empty() {
            return Err(Error::EmptyTopic);
        }
        let message = message?;

        if self.settings.trace {
            trace!(topic, uuid = message.uuid(), attributes = ?message.attributes(), "publishing");
        } else if self.settings.debug {
            debug!(topic, uuid = message.uuid(), "publishing");
        }

        let timeout = self.settings.publish_timeout;
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(Error::Cancelled(topic.to_string())),
            outcome = tokio::time::timeout(timeout, self.transport.publish(topic, &message)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout {
                        topic: topic.to_string(),
                        timeout,
                    }),
                }
            }
        }
    }
}
