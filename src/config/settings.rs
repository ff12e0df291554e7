use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Publish timeout applied when none (or a non-positive one) is configured.
pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 5;

/// Top-level configuration settings for the application.
///
/// Includes the publisher configuration and the settings of the load driver.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub publisher: PublisherSettings,
    pub run: RunSettings,
}

/// Resolved configuration of a single publisher.
///
/// All fields are filled; see [`PartialPublisherSettings::resolve`] for the
/// defaults.
#[derive(Clone, PartialEq, Eq)]
pub struct PublisherSettings {
    pub project_id: String,
    /// Serialized service account key, injected verbatim into the client.
    pub credentials: Option<String>,
    pub publish_timeout: Duration,
    pub debug: bool,
    pub trace: bool,
    pub do_not_create_topic_if_missing: bool,
}

impl PublisherSettings {
    /// Log level implied by the `debug` and `trace` flags.
    pub fn log_level(&self) -> &'static str {
        if self.trace {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

impl Default for PublisherSettings {
    fn default() -> Self {
        PartialPublisherSettings::default().resolve()
    }
}

impl fmt::Debug for PublisherSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherSettings")
            .field("project_id", &self.project_id)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .field("publish_timeout", &self.publish_timeout)
            .field("debug", &self.debug)
            .field("trace", &self.trace)
            .field(
                "do_not_create_topic_if_missing",
                &self.do_not_create_topic_if_missing,
            )
            .finish()
    }
}

/// Settings of the bundled load driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub topic: String,
    pub message: String,
    pub vus: usize,
    pub iterations: u64,
    /// Publish into an in-memory transport instead of Pub/Sub.
    pub dry_run: bool,
    pub log_level: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            topic: "load-test".to_string(),
            message: "hello".to_string(),
            vus: 1,
            iterations: 10,
            dry_run: false,
            log_level: "info".to_string(),
        }
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Any value may be missing; missing values are filled using defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    pub publisher: Option<PartialPublisherSettings>,
    pub run: Option<PartialRunSettings>,
}

/// Publisher options as written by the user.
///
/// Unknown keys are rejected. The camelCase spellings common in test scripts
/// are accepted next to the snake_case names.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialPublisherSettings {
    #[serde(alias = "projectId", alias = "projectID")]
    pub project_id: Option<String>,
    pub credentials: Option<String>,
    #[serde(alias = "publishTimeout")]
    pub publish_timeout: Option<i64>,
    pub debug: Option<bool>,
    pub trace: Option<bool>,
    #[serde(alias = "doNotCreateTopicIfMissing")]
    pub do_not_create_topic_if_missing: Option<bool>,
}

impl PartialPublisherSettings {
    /// Fills missing values with defaults.
    pub fn resolve(self) -> PublisherSettings {
        let timeout_secs = match self.publish_timeout {
            Some(secs) if secs > 0 => secs as u64,
            _ => DEFAULT_PUBLISH_TIMEOUT_SECS,
        };

        PublisherSettings {
            project_id: self.project_id.unwrap_or_default(),
            credentials: self.credentials.filter(|c| !c.is_empty()),
            publish_timeout: Duration::from_secs(timeout_secs),
            debug: self.debug.unwrap_or(false),
            trace: self.trace.unwrap_or(false),
            do_not_create_topic_if_missing: self.do_not_create_topic_if_missing.unwrap_or(false),
        }
    }
}

/// Partial load driver settings.
#[derive(Debug, Default, Deserialize)]
pub struct PartialRunSettings {
    pub topic: Option<String>,
    pub message: Option<String>,
    pub vus: Option<usize>,
    pub iterations: Option<u64>,
    pub dry_run: Option<bool>,
    pub log_level: Option<String>,
}

impl PartialRunSettings {
    pub fn resolve(self) -> RunSettings {
        let default = RunSettings::default();
        RunSettings {
            topic: self.topic.unwrap_or(default.topic),
            message: self.message.unwrap_or(default.message),
            vus: self.vus.filter(|v| *v > 0).unwrap_or(default.vus),
            iterations: self.iterations.unwrap_or(default.iterations),
            dry_run: self.dry_run.unwrap_or(default.dry_run),
            log_level: self.log_level.unwrap_or(default.log_level),
        }
    }
}
