//! Records of the backend's NDJSON reply stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::thread::ThreadEvent;
use crate::error::Result;

/// One line of the reply stream, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum StreamRecord {
    /// A realtime-session event for the peer, forwarded verbatim.
    OpenaiEvent(Value),
    /// An application thread event.
    ThreadEvent(Value),
}

impl StreamRecord {
    /// Validate a `threadEvent` body; `None` for `openaiEvent` records.
    pub fn thread_event(&self) -> Option<Result<ThreadEvent>> {
        match self {
            Self::ThreadEvent(data) => Some(ThreadEvent::from_payload(data.clone())),
            Self::OpenaiEvent(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_both_record_types() {
        let record: StreamRecord = serde_json::from_str(
            r#"{"type":"openaiEvent","data":{"type":"session.created"}}"#,
        )
        .unwrap();
        assert_eq!(record, StreamRecord::OpenaiEvent(json!({"type": "session.created"})));
        assert!(record.thread_event().is_none());

        let record: StreamRecord = serde_json::from_str(
            r#"{"type":"threadEvent","data":{"event":"thread.created","data":{"id":"thread_1"}}}"#,
        )
        .unwrap();
        let event = record.thread_event().unwrap().unwrap();
        assert_eq!(event.name(), "thread.created");
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let parsed = serde_json::from_str::<StreamRecord>(r#"{"type":"debugEvent","data":{}}"#);
        assert!(parsed.is_err());
    }
}
