//! Inbound event payloads.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DispatchError, DispatchResult};

/// An event delivered by the platform.
///
/// `payload` holds the whole JSON body, including the `type` field.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The `type` discriminator.
    pub event_type: String,
    /// The parsed body.
    pub payload: Value,
}

impl Event {
    /// Creates an event from an already parsed body.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Parses a raw body, requiring a string `type` field.
    pub fn parse(raw: &[u8]) -> DispatchResult<Self> {
        let payload: Value = serde_json::from_slice(raw)?;

        let event_type = payload
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DispatchError::InvalidPayload("missing string field 'type'".to_string())
            })?
            .to_string();

        Ok(Self {
            event_type,
            payload,
        })
    }

    /// Returns a top-level field of the payload.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Deserializes the payload into a typed structure.
    pub fn deserialize<T: DeserializeOwned>(&self) -> DispatchResult<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_parse_extracts_type() {
        let event = Event::parse(br#"{"type":"room.message","room_id":"r1"}"#).unwrap();
        assert_eq!(event.event_type, "room.message");
        assert_eq!(event.field("room_id"), Some(&Value::from("r1")));
    }

    #[test]
    fn test_parse_rejects_missing_or_non_string_type() {
        assert!(matches!(
            Event::parse(br#"{"kind":"x"}"#),
            Err(DispatchError::InvalidPayload(_))
        ));
        assert!(matches!(
            Event::parse(br#"{"type":42}"#),
            Err(DispatchError::InvalidPayload(_))
        ));
        assert!(matches!(
            Event::parse(b"not json"),
            Err(DispatchError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_deserialize_typed() {
        #[derive(Deserialize)]
        struct Message {
            room_id: String,
            body: String,
        }

        let event =
            Event::parse(br#"{"type":"room.message","room_id":"r1","body":"hi"}"#).unwrap();
        let message: Message = event.deserialize().unwrap();
        assert_eq!(message.room_id, "r1");
        assert_eq!(message.body, "hi");
    }
}
