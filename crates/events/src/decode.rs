//! Message decoding: topic classification first, then payload parsing.

use thiserror::Error;

use crate::event::{EventKind, MovieEvent, MovieEventPayload, RawMessage};

/// Why a message could not become a [`MovieEvent`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown topic `{0}`")]
    UnknownTopic(String),

    #[error("malformed `{topic}` payload: {reason}")]
    Malformed { topic: String, reason: String },
}

impl DecodeError {
    fn malformed(topic: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            topic: topic.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub fn decode(message: &RawMessage) -> Result<MovieEvent, DecodeError> {
    let kind = EventKind::from_topic(&message.topic)
        .ok_or_else(|| DecodeError::UnknownTopic(message.topic.clone()))?;

    let payload: MovieEventPayload = serde_json::from_slice(&message.value)
        .map_err(|e| DecodeError::malformed(&message.topic, e))?;

    if payload.name.trim().is_empty() {
        return Err(DecodeError::malformed(&message.topic, "name is empty"));
    }

    Ok(MovieEvent {
        kind,
        key: message.key.clone(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use movies_core::MovieId;
    use serde_json::json;

    fn msg(topic: &str, value: serde_json::Value) -> RawMessage {
        RawMessage::new(topic, value.to_string())
    }

    #[test]
    fn decodes_minimal_payload() {
        let message =
            msg("movie-created", json!({ "id": 1, "name": "Matrix", "year": 1999 })).with_key("1");
        let event = decode(&message).unwrap();
        assert_eq!(event.kind, EventKind::Created);
        assert_eq!(event.key.as_deref(), Some("1"));
        assert_eq!(event.id(), MovieId::new(1));
        assert_eq!(event.payload.rating, None);
    }

    #[test]
    fn ignores_unknown_fields() {
        let event = decode(&msg(
            "movie-updated",
            json!({ "id": 2, "name": "Heat", "year": 1995, "rating": 8.3, "director": "Mann" }),
        ))
        .unwrap();
        assert_eq!(event.payload.rating, Some(8.3));
    }

    #[test]
    fn unknown_topic_is_reported_before_parsing() {
        let err = decode(&RawMessage::new("movie-archived", "not even json")).unwrap_err();
        assert_eq!(err, DecodeError::UnknownTopic("movie-archived".into()));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = decode(&RawMessage::new("movie-created", "{ id: 1,")).unwrap_err();
        assert!(
            matches!(err, DecodeError::Malformed { ref topic, .. } if topic == "movie-created")
        );
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = decode(&RawMessage::new("movie-created", vec![0xff, 0xfe, 0x00])).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = decode(&msg("movie-deleted", json!({ "id": 1, "name": "Matrix" }))).unwrap_err();
        match err {
            DecodeError::Malformed { reason, .. } => assert!(reason.contains("year"), "{reason}"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn blank_name_is_malformed() {
        let message = msg("movie-created", json!({ "id": 1, "name": " ", "year": 1999 }));
        let err = decode(&message).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }
}
