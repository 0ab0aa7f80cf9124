//! Platform seams for media capture, playback, and WebRTC transport.
//!
//! The crate does not own a WebRTC or audio stack. Applications implement
//! these traits over whatever their platform provides.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::IceServer;
use crate::error::Result;

/// A set of audio tracks (local microphone or remote assistant).
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    /// Enable or disable every audio track of the stream.
    fn set_audio_enabled(&self, enabled: bool);

    fn audio_enabled(&self) -> bool;
}

/// Microphone access.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Request an audio-only capture stream. Permission denial is a
    /// [`crate::error::SuperinterfaceError::MediaDevice`].
    async fn microphone(&self) -> Result<Arc<dyn MediaStream>>;
}

/// Autoplaying sink for the remote assistant stream.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Attach a stream as the output source, or detach with `None`.
    fn set_source(&self, stream: Option<Arc<dyn MediaStream>>);

    async fn play(&self) -> Result<()>;
}

/// Level/waveform tap for visualization.
pub trait AudioAnalyser: Send + Sync {
    /// Current frequency-domain magnitudes, one byte per bin.
    fn frequency_data(&self) -> Vec<u8>;
}

pub trait AnalyserFactory: Send + Sync {
    fn create(&self, stream: &Arc<dyn MediaStream>) -> Result<Arc<dyn AudioAnalyser>>;
}

/// Bidirectional text channel over the peer connection.
#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> &str;

    /// Send one text frame. A closed or failed channel is a
    /// [`crate::error::SuperinterfaceError::DataChannel`].
    async fn send_text(&self, payload: String) -> Result<()>;
}

/// Callbacks from an open peer connection.
#[derive(Clone)]
pub enum PeerEvent {
    /// The remote side attached its first media stream.
    RemoteTrack(Arc<dyn MediaStream>),
    /// A text message arrived on a data channel.
    DataChannelMessage { label: String, payload: String },
}

impl std::fmt::Debug for PeerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoteTrack(stream) => f.debug_tuple("RemoteTrack").field(&stream.id()).finish(),
            Self::DataChannelMessage { label, payload } => f
                .debug_struct("DataChannelMessage")
                .field("label", label)
                .field("payload", payload)
                .finish(),
        }
    }
}

/// A negotiated-or-negotiating peer connection.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn add_stream(&self, stream: Arc<dyn MediaStream>) -> Result<()>;

    async fn create_data_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>>;

    /// Create an SDP offer and apply it as the local description.
    async fn create_offer(&self) -> Result<String>;

    async fn set_remote_answer(&self, sdp: &str) -> Result<()>;

    async fn close(&self);
}

/// Opens peer connections.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Open a connection; its callbacks arrive on the returned receiver.
    async fn open(
        &self,
        ice_servers: &[IceServer],
    ) -> Result<(Arc<dyn PeerConnection>, mpsc::UnboundedReceiver<PeerEvent>)>;
}
