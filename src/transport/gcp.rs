use std::fmt;

use google_cloud_googleapis::pubsub::v1::PubsubMessage;
use google_cloud_pubsub::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::publisher::Publisher;
use tracing::{debug, info, trace};

use crate::config::PublisherSettings;
use crate::message::Message;
use crate::transport::Transport;
use crate::transport::cache::TopicCache;
use crate::utils::{Error, Result};

/// Where the client takes its credentials from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CredentialSource<'a> {
    /// Serialized service account key, passed through untouched.
    Key(&'a str),
    /// Credential discovery from the environment.
    Ambient,
}

pub(crate) fn credential_source(settings: &PublisherSettings) -> CredentialSource<'_> {
    match settings.credentials.as_deref() {
        Some(key) if !key.is_empty() => CredentialSource::Key(key),
        _ => CredentialSource::Ambient,
    }
}

pub(crate) async fn parse_credentials(key: &str) -> Result<CredentialsFile> {
    CredentialsFile::new_from_str(key)
        .await
        .map_err(|e| Error::Construction(format!("invalid credentials: {e}")))
}

/// Overrides the project found in the credentials, if one is configured.
pub(crate) fn apply_project(config: &mut ClientConfig, settings: &PublisherSettings) {
    if !settings.project_id.is_empty() {
        config.project_id = Some(settings.project_id.clone());
    }
}

async fn client_config(settings: &PublisherSettings) -> Result<ClientConfig> {
    let mut config = match credential_source(settings) {
        CredentialSource::Key(key) => {
            let credentials = parse_credentials(key).await?;
            ClientConfig::default()
                .with_credentials(credentials)
                .await
                .map_err(|e| Error::Construction(e.to_string()))?
        }
        CredentialSource::Ambient => ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| Error::Construction(e.to_string()))?,
    };
    apply_project(&mut config, settings);
    Ok(config)
}

/// Transport backed by the Google Cloud Pub/Sub client.
///
/// The first publish to a topic checks that it exists, creating it unless
/// `do_not_create_topic_if_missing` is set, and caches a publisher for it.
pub struct GcpTransport {
    client: Client,
    publishers: TopicCache<Publisher>,
    create_missing_topics: bool,
}

impl GcpTransport {
    /// Builds the client eagerly.
    ///
    /// Credentials from the settings are injected as a service account key;
    /// without them the client discovers credentials from the environment.
    /// `PUBSUB_EMULATOR_HOST` is honored by the client itself.
    pub async fn connect(settings: &PublisherSettings) -> Result<Self> {
        let config = client_config(settings).await?;
        let client = Client::new(config)
            .await
            .map_err(|e| Error::Construction(e.to_string()))?;

        info!(project = %settings.project_id, "pubsub client ready");

        Ok(Self {
            client,
            publishers: TopicCache::new(),
            create_missing_topics: !settings.do_not_create_topic_if_missing,
        })
    }

    async fn topic_publisher(&self, topic: &str) -> Result<Publisher> {
        let (publisher, discarded) = self
            .publishers
            .get_or_open(topic, || self.open_topic(topic))
            .await?;

        if let Some(mut extra) = discarded {
            extra.shutdown().await;
        }
        Ok(publisher)
    }

    async fn open_topic(&self, topic: &str) -> Result<Publisher> {
        let handle = self.client.topic(topic);
        let exists = handle
            .exists(None)
            .await
            .map_err(|status| Error::Transport(status.to_string()))?;

        if !exists {
            if !self.create_missing_topics {
                return Err(Error::TopicNotFound(topic.to_string()));
            }
            info!(topic, "creating missing topic");
            if let Err(status) = handle.create(None, None).await {
                // another publisher may have created it meanwhile
                let created = handle
                    .exists(None)
                    .await
                    .map_err(|status| Error::Transport(status.to_string()))?;
                if !created {
                    return Err(Error::Transport(status.to_string()));
                }
            }
        }

        Ok(handle.new_publisher(None))
    }
}

impl Transport for GcpTransport {
    async fn publish(&self, topic: &str, message: &Message) -> Result<()> {
        let publisher = self.topic_publisher(topic).await?;

        let awaiter = publisher
            .publish(PubsubMessage {
                data: message.payload().to_vec(),
                attributes: message.wire_attributes(),
                ..Default::default()
            })
            .await;

        let server_id = awaiter
            .get()
            .await
            .map_err(|status| Error::Transport(status.to_string()))?;

        trace!(topic, uuid = message.uuid(), %server_id, "message acknowledged");
        Ok(())
    }

    async fn shutdown(&self) {
        for (topic, mut publisher) in self.publishers.drain().await {
            publisher.shutdown().await;
            debug!(topic, "publisher stopped");
        }
    }
}

impl fmt::Debug for GcpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcpTransport")
            .field("client", &"google_cloud_pubsub::Client")
            .field("create_missing_topics", &self.create_missing_topics)
            .finish()
    }
}
