//! Assistant thread state as served by the backend.
//!
//! These are read-only views: messages, their run steps and annotations are
//! deserialized and handed to presentation code, never mutated locally.

pub mod annotation;
pub mod message;
pub mod run;
pub mod run_step;

pub use annotation::{Annotation, AnnotationView};
pub use message::{MessageContent, MessageRole, MessageStatus, SerializedMessage, TextContent};
pub use run::{RequiredAction, Run, RunStatus, Thread, ToolCall};
pub use run_step::{partition_run_steps, RunStep, RunStepPartition, RunStepStatus, StepDetails};
