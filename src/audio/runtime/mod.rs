//! WebRTC realtime audio runtime.
//!
//! One [`WebrtcAudioRuntime`] owns one peer connection, one `oai-events` data
//! channel, the microphone stream, and the remote assistant stream.

pub mod relay;
pub mod signaling;
pub mod state;
mod webrtc;

pub use relay::{EventRelay, PumpSummary, THREAD_ID_VARIABLE};
pub use signaling::WebrtcSignaling;
pub use state::{AssistantState, RecorderStatus, RuntimeState, UserState};
pub use webrtc::{MediaPlatform, RuntimeOptions, WebrtcAudioRuntime, EVENTS_CHANNEL_LABEL};
