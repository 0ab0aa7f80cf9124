//! Convenience re-exports for common use.

pub use crate::audio::{MessageAudio, RecorderStatus, RuntimeState, TtsClient, WebrtcAudioRuntime};
pub use crate::config::SuperinterfaceConfig;
pub use crate::context::SuperinterfaceContext;
pub use crate::error::{Result, SuperinterfaceError};
pub use crate::events::{RealtimeEvent, StreamRecord, ThreadEvent, ThreadEventHandler};
pub use crate::threads::{partition_run_steps, SerializedMessage};
