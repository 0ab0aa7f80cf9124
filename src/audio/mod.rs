//! Audio capabilities: realtime WebRTC runtime and message TTS playback.

pub mod media;
pub mod message_audio;
pub mod runtime;
pub mod tts;

pub use media::{
    AnalyserFactory, AudioAnalyser, AudioOutput, DataChannel, MediaDevices, MediaStream,
    PeerConnection, PeerConnector, PeerEvent,
};
pub use message_audio::{AudioPlayer, MessageAudio, PlaybackSource};
pub use runtime::{RecorderStatus, RuntimeState, WebrtcAudioRuntime};
pub use tts::TtsClient;
