//! The `config` module turns user supplied options into typed settings.
//!
//! Publisher options arrive either as a dynamic map handed over by test code
//! ([`PublisherSettings::from_map`]) or from the layered file + environment
//! configuration read by [`load_config`].

mod settings;

use config::{Config, Environment, File};
use serde_json::{Map, Value};

use crate::utils::{Error, Result};

pub use settings::{
    DEFAULT_PUBLISH_TIMEOUT_SECS, PartialPublisherSettings, PartialRunSettings, PartialSettings,
    PublisherSettings, RunSettings, Settings,
};

/// Prefix of the environment variables read by [`load_config`].
pub const ENV_PREFIX: &str = "PUBSUB";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the publisher and run configurations
pub fn load_config() -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(Settings {
        publisher: partial.publisher.unwrap_or_default().resolve(),
        run: partial.run.unwrap_or_default().resolve(),
    })
}

impl PublisherSettings {
    /// Decodes publisher options from a dynamic map.
    ///
    /// Any key may be omitted. Keys match regardless of case and underscores,
    /// so `ProjectID`, `projectId` and `project_id` are the same option. A
    /// fractional `publish_timeout` is truncated to whole seconds. Unknown
    /// keys and values of the wrong type are rejected with [`Error::Config`].
    pub fn from_map(options: &Map<String, Value>) -> Result<Self> {
        let partial: PartialPublisherSettings =
            serde_json::from_value(Value::Object(normalize_options(options)?))?;
        Ok(partial.resolve())
    }

    /// Like [`PublisherSettings::from_map`], for an arbitrary JSON value.
    /// `null` is treated as an empty map.
    pub fn from_value(options: Value) -> Result<Self> {
        match options {
            Value::Null => Ok(PartialPublisherSettings::default().resolve()),
            Value::Object(map) => Self::from_map(&map),
            other => Err(Error::Config(format!(
                "expected a map of publisher options, got `{other}`"
            ))),
        }
    }
}

/// Option names understood by [`PublisherSettings::from_map`].
const PUBLISHER_OPTIONS: [&str; 6] = [
    "project_id",
    "credentials",
    "publish_timeout",
    "debug",
    "trace",
    "do_not_create_topic_if_missing",
];

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Rewrites recognized keys to their canonical names and truncates a
/// fractional timeout. Unrecognized keys are kept as given so decoding
/// reports them by name.
fn normalize_options(options: &Map<String, Value>) -> Result<Map<String, Value>> {
    let mut normalized = Map::with_capacity(options.len());

    for (key, value) in options {
        let folded = fold_key(key);
        let name = PUBLISHER_OPTIONS
            .iter()
            .find(|option| fold_key(option) == folded)
            .map(|option| option.to_string())
            .unwrap_or_else(|| key.clone());

        let value = match (name.as_str(), value) {
            ("publish_timeout", Value::Number(n)) if n.as_i64().is_none() => {
                match n.as_f64() {
                    Some(secs) if secs.is_finite() => Value::from(secs.trunc() as i64),
                    _ => value.clone(),
                }
            }
            _ => value.clone(),
        };

        if normalized.insert(name.clone(), value).is_some() {
            return Err(Error::Config(format!("option `{name}` given more than once")));
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests;
