//! Serialized assistant messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::annotation::Annotation;
use super::run_step::{RunStep, RunStepStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageStatus {
    InProgress,
    Incomplete,
    Completed,
    #[serde(other)]
    Unknown,
}

/// A thread message together with the run steps of its run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub status: Option<MessageStatus>,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(rename = "runSteps", default)]
    pub run_steps: Vec<RunStep>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<Value>,
    #[serde(default)]
    pub metadata: Value,
}

impl SerializedMessage {
    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// Text parts in order.
    pub fn text_parts(&self) -> impl Iterator<Item = &TextContent> {
        self.content.iter().filter_map(|part| match part {
            MessageContent::Text { text } => Some(text),
            _ => None,
        })
    }

    /// Whether a spinner should follow this message.
    ///
    /// Only while a message mutation is in flight; then the message or any of
    /// its run steps must still be in progress.
    pub fn is_in_progress(&self, is_mutating: bool) -> bool {
        if !is_mutating {
            return false;
        }
        if self.status == Some(MessageStatus::InProgress) {
            return true;
        }
        self.run_steps
            .iter()
            .any(|step| step.status == RunStepStatus::InProgress)
    }
}

/// One content part of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    ImageFile { image_file: Value },
    ImageUrl { image_url: Value },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(status: &str, step_status: &str) -> SerializedMessage {
        serde_json::from_value(json!({
            "id": "msg_1",
            "role": "assistant",
            "status": status,
            "content": [
                {"type": "text", "text": {"value": "Hi", "annotations": []}},
                {"type": "refusal", "refusal": "no"}
            ],
            "runSteps": [
                {"id": "step_1", "status": step_status, "step_details": {"type": "tool_calls", "tool_calls": []}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_backend_shape() {
        let msg = message("completed", "completed");
        assert!(msg.is_assistant());
        assert_eq!(msg.run_steps.len(), 1);
        assert_eq!(msg.content[1], MessageContent::Unsupported);
        assert_eq!(msg.text_parts().map(|t| t.value.as_str()).collect::<Vec<_>>(), vec!["Hi"]);
    }

    #[test]
    fn in_progress_requires_mutation() {
        let msg = message("in_progress", "completed");
        assert!(!msg.is_in_progress(false));
        assert!(msg.is_in_progress(true));
    }

    #[test]
    fn in_progress_follows_run_steps() {
        assert!(message("completed", "in_progress").is_in_progress(true));
        assert!(!message("completed", "completed").is_in_progress(true));
    }
}
