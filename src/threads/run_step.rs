//! Run steps and their placement around a message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::message::SerializedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStepStatus {
    InProgress,
    Cancelled,
    Failed,
    Completed,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    pub id: String,
    pub status: RunStepStatus,
    pub step_details: StepDetails,
}

impl RunStep {
    pub fn is_message_creation(&self) -> bool {
        matches!(self.step_details, StepDetails::MessageCreation { .. })
    }

    /// Whether this step created the message with `message_id`.
    pub fn created_message(&self, message_id: &str) -> bool {
        match &self.step_details {
            StepDetails::MessageCreation { message_creation } => {
                message_creation.message_id == message_id
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    MessageCreation { message_creation: MessageCreation },
    ToolCalls {
        #[serde(default)]
        tool_calls: Vec<Value>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCreation {
    pub message_id: String,
}

/// Run steps split around the step that created a message.
///
/// Steps are ordered newest first, so `later` holds the steps that ran after
/// the message was created and `older` the ones that ran before it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunStepPartition<'a> {
    pub older: &'a [RunStep],
    pub later: &'a [RunStep],
}

/// Split `message.run_steps` around the message's creation step.
pub fn partition_run_steps(message: &SerializedMessage) -> RunStepPartition<'_> {
    let steps = message.run_steps.as_slice();
    if steps.is_empty() {
        return RunStepPartition::default();
    }

    let Some(created) = steps.iter().position(|step| step.created_message(&message.id)) else {
        return RunStepPartition {
            older: steps,
            later: &[],
        };
    };

    let later_start = steps[..created]
        .iter()
        .rposition(RunStep::is_message_creation)
        .map_or(0, |preceding| preceding + 1);

    let after = &steps[created + 1..];
    let older_len = after
        .iter()
        .position(RunStep::is_message_creation)
        .unwrap_or(after.len());

    RunStepPartition {
        older: &after[..older_len],
        later: &steps[later_start..created],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool_step(id: &str) -> Value {
        json!({"id": id, "status": "completed", "step_details": {"type": "tool_calls", "tool_calls": []}})
    }

    fn creation_step(id: &str, message_id: &str) -> Value {
        json!({
            "id": id,
            "status": "completed",
            "step_details": {"type": "message_creation", "message_creation": {"message_id": message_id}}
        })
    }

    fn message_with(steps: Vec<Value>) -> SerializedMessage {
        serde_json::from_value(json!({
            "id": "msg_me",
            "role": "assistant",
            "content": [],
            "runSteps": steps,
        }))
        .unwrap()
    }

    fn ids(steps: &[RunStep]) -> Vec<&str> {
        steps.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn no_run_steps_gives_empty_partitions() {
        let msg = message_with(vec![]);
        let partition = partition_run_steps(&msg);
        assert!(partition.older.is_empty());
        assert!(partition.later.is_empty());
    }

    #[test]
    fn single_creation_step_splits_at_its_index() {
        let msg = message_with(vec![
            tool_step("a"),
            tool_step("b"),
            creation_step("c", "msg_me"),
            tool_step("d"),
            tool_step("e"),
        ]);
        let partition = partition_run_steps(&msg);
        assert_eq!(ids(partition.later), vec!["a", "b"]);
        assert_eq!(ids(partition.older), vec!["d", "e"]);
    }

    #[test]
    fn bounded_by_neighbouring_message_creations() {
        let msg = message_with(vec![
            tool_step("a"),
            creation_step("b", "msg_newer"),
            tool_step("c"),
            creation_step("d", "msg_me"),
            tool_step("e"),
            tool_step("f"),
            creation_step("g", "msg_older"),
            tool_step("h"),
        ]);
        let partition = partition_run_steps(&msg);
        assert_eq!(ids(partition.later), vec!["c"]);
        assert_eq!(ids(partition.older), vec!["e", "f"]);
    }

    #[test]
    fn creation_step_at_edges() {
        let msg = message_with(vec![creation_step("a", "msg_me"), tool_step("b")]);
        let partition = partition_run_steps(&msg);
        assert!(partition.later.is_empty());
        assert_eq!(ids(partition.older), vec!["b"]);

        let msg = message_with(vec![tool_step("a"), creation_step("b", "msg_me")]);
        let partition = partition_run_steps(&msg);
        assert_eq!(ids(partition.later), vec!["a"]);
        assert!(partition.older.is_empty());
    }

    #[test]
    fn missing_creation_step_is_one_older_run() {
        let msg = message_with(vec![
            tool_step("a"),
            creation_step("b", "msg_other"),
            tool_step("c"),
        ]);
        let partition = partition_run_steps(&msg);
        assert!(partition.later.is_empty());
        assert_eq!(ids(partition.older), vec!["a", "b", "c"]);
    }
}
