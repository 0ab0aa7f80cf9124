//! Application thread events and their handler seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, SuperinterfaceError};
use crate::threads::{Run, Thread};

/// Thread lifecycle events relayed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadEvent {
    ThreadCreated(Thread),
    RunRequiresAction(Run),
    /// Any other `thread.*` event. Carried so callers can log it.
    Other { event: String },
}

impl ThreadEvent {
    pub const THREAD_CREATED: &'static str = "thread.created";
    pub const RUN_REQUIRES_ACTION: &'static str = "thread.run.requires_action";

    /// Validate a `threadEvent` payload: `{"event": "...", "data": {...}}`.
    pub fn from_payload(payload: Value) -> Result<Self> {
        let Value::Object(mut map) = payload else {
            return Err(SuperinterfaceError::InvalidArgument(
                "Thread event payload must be an object".into(),
            ));
        };
        let event = map
            .get("event")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| {
                SuperinterfaceError::InvalidArgument("Thread event is missing 'event'".into())
            })?;
        let data = map.remove("data").unwrap_or(Value::Null);

        match event.as_str() {
            Self::THREAD_CREATED => Ok(Self::ThreadCreated(serde_json::from_value(data)?)),
            Self::RUN_REQUIRES_ACTION => Ok(Self::RunRequiresAction(serde_json::from_value(data)?)),
            _ => Ok(Self::Other { event }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ThreadCreated(_) => Self::THREAD_CREATED,
            Self::RunRequiresAction(_) => Self::RUN_REQUIRES_ACTION,
            Self::Other { event } => event,
        }
    }
}

/// Application hooks for thread events arriving on the audio runtime.
#[async_trait]
pub trait ThreadEventHandler: Send + Sync {
    /// A thread was created for this session.
    async fn thread_created(&self, thread: &Thread) -> Result<()>;

    /// A run is waiting for tool outputs.
    async fn run_requires_action(&self, run: &Run) -> Result<()>;
}

/// Handler that only logs; useful when the application has no tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingThreadEventHandler;

#[async_trait]
impl ThreadEventHandler for LoggingThreadEventHandler {
    async fn thread_created(&self, thread: &Thread) -> Result<()> {
        tracing::info!(thread_id = %thread.id, "Thread created");
        Ok(())
    }

    async fn run_requires_action(&self, run: &Run) -> Result<()> {
        tracing::warn!(
            run_id = %run.id,
            tool_calls = run.pending_tool_calls().len(),
            "Run requires action but no tool handler is installed"
        );
        Ok(())
    }
}
