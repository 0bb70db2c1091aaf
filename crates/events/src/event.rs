use serde::{Deserialize, Serialize};

use movies_core::MovieId;

/// Topic names are `movie-<kind>`.
pub const TOPIC_PREFIX: &str = "movie-";

/// An undecoded message as delivered by the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub topic: String,
    pub key: Option<String>,
    /// UTF-8 JSON payload.
    pub value: Vec<u8>,
}

impl RawMessage {
    pub fn new(topic: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            key: None,
            value: value.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Lifecycle stage a movie event reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];

    /// Parse a topic of the form `movie-(created|updated|deleted)`.
    pub fn from_topic(topic: &str) -> Option<Self> {
        match topic.strip_prefix(TOPIC_PREFIX)? {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    pub fn topic(self) -> &'static str {
        match self {
            Self::Created => "movie-created",
            Self::Updated => "movie-updated",
            Self::Deleted => "movie-deleted",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.topic())
    }
}

/// Message value: `{id, name, year}` at minimum; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieEventPayload {
    pub id: MovieId,
    pub name: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// A decoded, typed movie event.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieEvent {
    pub kind: EventKind,
    pub key: Option<String>,
    pub payload: MovieEventPayload,
}

impl MovieEvent {
    pub fn id(&self) -> MovieId {
        self.payload.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_topics_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_topic(kind.topic()), Some(kind));
        }
    }

    #[test]
    fn rejects_near_misses() {
        let near_misses = [
            "movie-",
            "movie-Created",
            "movies-created",
            "movie-created ",
            "actor-created",
            "",
        ];
        for topic in near_misses {
            assert_eq!(EventKind::from_topic(topic), None, "{topic:?}");
        }
    }

    proptest! {
        #[test]
        fn only_the_three_canonical_topics_parse(topic in "[a-z-]{0,16}") {
            let canonical = EventKind::ALL.iter().any(|k| k.topic() == topic);
            prop_assert_eq!(EventKind::from_topic(&topic).is_some(), canonical);
        }
    }
}
