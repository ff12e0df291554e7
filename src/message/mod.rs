//! The `message` module defines the envelope handed to a transport for a
//! single publish call.

use std::collections::HashMap;

use uuid::Uuid;

use crate::utils::{Error, Result};

/// Attribute under which the locally generated message id travels on the wire.
pub const UUID_ATTRIBUTE: &str = "_message_uuid";

/// A message ready to be published.
///
/// Every message gets a fresh UUID at construction. The payload and the
/// attributes are stored exactly as given and never change afterwards.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use pubsub_adapter::message::Message;
///
/// let attributes = HashMap::from([("k".to_string(), "v".to_string())]);
/// let msg = Message::with_attributes("hello", attributes).unwrap();
/// assert_eq!(msg.payload_str(), Some("hello"));
/// assert_eq!(msg.attributes()["k"], "v");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    uuid: String,
    payload: Vec<u8>,
    attributes: HashMap<String, String>,
}

impl Message {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            payload: payload.into(),
            attributes: HashMap::new(),
        }
    }

    /// Creates a message carrying `attributes` as metadata.
    ///
    /// Fails with [`Error::ReservedAttribute`] if the caller tries to set
    /// [`UUID_ATTRIBUTE`].
    pub fn with_attributes(
        payload: impl Into<Vec<u8>>,
        attributes: HashMap<String, String>,
    ) -> Result<Self> {
        if attributes.contains_key(UUID_ATTRIBUTE) {
            return Err(Error::ReservedAttribute(UUID_ATTRIBUTE.to_string()));
        }
        Ok(Self {
            attributes,
            ..Self::new(payload)
        })
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Attributes as sent to the service: the caller's attributes plus the
    /// message UUID.
    pub fn wire_attributes(&self) -> HashMap<String, String> {
        let mut attributes = self.attributes.clone();
        attributes.insert(UUID_ATTRIBUTE.to_string(), self.uuid.clone());
        attributes
    }
}
