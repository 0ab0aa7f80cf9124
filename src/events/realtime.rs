//! Realtime-session event types.

use serde_json::Value;
use strum::{Display, EnumString};

/// Event types the backend wants to observe. Everything else stays local.
pub const LOGGED_EVENT_TYPES: [&str; 3] = [
    "session.created",
    "response.done",
    "conversation.item.input_audio_transcription.completed",
];

#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ResponseStatus {
    Completed,
    Cancelled,
    Failed,
    Incomplete,
    InProgress,
    #[strum(default)]
    Other(String),
}

/// Events in a realtime audio session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    SessionCreated { session_id: String },
    SessionUpdated { session_id: Option<String> },
    ResponseDone {
        response_id: Option<String>,
        status: ResponseStatus,
    },
    InputTranscriptionCompleted {
        item_id: Option<String>,
        transcript: String,
    },
    AudioTranscriptDelta { text: String },
    Error { message: String },
    Unknown { event_type: String },
}

impl RealtimeEvent {
    /// Parse a server event payload into a typed realtime event.
    ///
    /// `None` when the payload has no string `type`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let event_type = payload.get("type")?.as_str()?;
        let event = match event_type {
            "session.created" => Self::SessionCreated {
                session_id: string_at(payload, &["session", "id"])
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            "session.updated" => Self::SessionUpdated {
                session_id: string_at(payload, &["session", "id"]),
            },
            "response.done" => Self::ResponseDone {
                response_id: string_at(payload, &["response", "id"]),
                status: string_at(payload, &["response", "status"])
                    .map(|s| s.parse().unwrap_or(ResponseStatus::Other(s)))
                    .unwrap_or_else(|| ResponseStatus::Other(String::new())),
            },
            "conversation.item.input_audio_transcription.completed" => {
                Self::InputTranscriptionCompleted {
                    item_id: string_field(payload, "item_id"),
                    transcript: string_field(payload, "transcript").unwrap_or_default(),
                }
            }
            "response.audio_transcript.delta" => Self::AudioTranscriptDelta {
                text: string_field(payload, "delta").unwrap_or_default(),
            },
            "error" => Self::Error {
                message: string_at(payload, &["error", "message"])
                    .unwrap_or_else(|| "Realtime server error".to_string()),
            },
            other => Self::Unknown {
                event_type: other.to_string(),
            },
        };
        Some(event)
    }

    /// Whether this event is posted to the backend event log.
    ///
    /// Session bootstrap, finished input transcripts, and completed responses
    /// only.
    pub fn is_logged(&self) -> bool {
        match self {
            Self::SessionCreated { .. } | Self::InputTranscriptionCompleted { .. } => true,
            Self::ResponseDone { status, .. } => *status == ResponseStatus::Completed,
            _ => false,
        }
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn logged(payload: Value) -> bool {
        RealtimeEvent::from_payload(&payload)
            .map(|e| e.is_logged())
            .unwrap_or(false)
    }

    #[test]
    fn allow_list_matches_logged_types() {
        for event_type in LOGGED_EVENT_TYPES {
            let payload = json!({"type": event_type, "response": {"status": "completed"}});
            assert!(logged(payload), "{event_type} should be logged");
        }
    }

    #[test]
    fn response_done_only_when_completed() {
        assert!(logged(json!({
            "type": "response.done",
            "response": {"id": "r", "status": "completed"}
        })));
        assert!(!logged(json!({"type": "response.done", "response": {"status": "cancelled"}})));
        assert!(!logged(json!({"type": "response.done", "response": {"status": "in_progress"}})));
        assert!(!logged(json!({"type": "response.done"})));
    }

    #[test]
    fn other_types_are_never_logged() {
        for event_type in [
            "session.updated",
            "response.audio_transcript.delta",
            "input_audio_buffer.speech_started",
            "error",
            "rate_limits.updated",
        ] {
            assert!(!logged(json!({"type": event_type})), "{event_type} should stay local");
        }
        assert!(!logged(json!({"no_type": true})));
    }

    #[test]
    fn parses_transcription_completed() {
        let event = RealtimeEvent::from_payload(&json!({
            "type": "conversation.item.input_audio_transcription.completed",
            "item_id": "item_1",
            "transcript": "what's the weather"
        }))
        .unwrap();
        assert_eq!(
            event,
            RealtimeEvent::InputTranscriptionCompleted {
                item_id: Some("item_1".into()),
                transcript: "what's the weather".into(),
            }
        );
    }

    #[test]
    fn unknown_response_status_is_preserved() {
        let event = RealtimeEvent::from_payload(&json!({
            "type": "response.done", "response": {"status": "queued"}
        }))
        .unwrap();
        assert_eq!(
            event,
            RealtimeEvent::ResponseDone {
                response_id: None,
                status: ResponseStatus::Other("queued".into()),
            }
        );
    }
}
