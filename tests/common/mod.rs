//! Shared test helpers: in-memory media platform and peer connection.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use superinterface::audio::media::{
    AnalyserFactory, AudioAnalyser, AudioOutput, DataChannel, MediaDevices, MediaStream,
    PeerConnection, PeerConnector, PeerEvent,
};
use superinterface::audio::runtime::MediaPlatform;
use superinterface::config::IceServer;
use superinterface::error::{Result, SuperinterfaceError};

pub const OFFER_SDP: &str = "v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\ns=offer\r\n";
pub const ANSWER_SDP: &str = "v=0\r\no=- 3 4 IN IP4 127.0.0.1\r\ns=answer\r\n";

pub struct FakeStream {
    id: String,
    enabled: AtomicBool,
}

impl FakeStream {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            enabled: AtomicBool::new(true),
        })
    }
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_audio_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn audio_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

pub struct FakeDevices {
    pub microphone: Arc<FakeStream>,
    pub deny: AtomicBool,
    pub requests: AtomicUsize,
}

#[async_trait]
impl MediaDevices for FakeDevices {
    async fn microphone(&self) -> Result<Arc<dyn MediaStream>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.deny.load(Ordering::SeqCst) {
            return Err(SuperinterfaceError::MediaDevice("Permission denied".into()));
        }
        Ok(self.microphone.clone())
    }
}

#[derive(Default)]
pub struct FakeOutput {
    pub source: Mutex<Option<String>>,
    pub detached: AtomicUsize,
    pub plays: AtomicUsize,
}

#[async_trait]
impl AudioOutput for FakeOutput {
    fn set_source(&self, stream: Option<Arc<dyn MediaStream>>) {
        if stream.is_none() {
            self.detached.fetch_add(1, Ordering::SeqCst);
        }
        *self.source.lock().unwrap() = stream.map(|s| s.id().to_string());
    }

    async fn play(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FlatAnalyser;

impl AudioAnalyser for FlatAnalyser {
    fn frequency_data(&self) -> Vec<u8> {
        vec![0; 32]
    }
}

#[derive(Default)]
pub struct FakeAnalysers {
    pub fail: AtomicBool,
    /// Block each construction for this many milliseconds.
    pub delay_ms: AtomicU64,
    pub created_for: Mutex<Vec<String>>,
}

impl AnalyserFactory for FakeAnalysers {
    fn create(&self, stream: &Arc<dyn MediaStream>) -> Result<Arc<dyn AudioAnalyser>> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SuperinterfaceError::Visualization("no audio context".into()));
        }
        self.created_for.lock().unwrap().push(stream.id().to_string());
        Ok(Arc::new(FlatAnalyser))
    }
}

#[derive(Default)]
pub struct FakeChannel {
    pub label: Mutex<String>,
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl DataChannel for FakeChannel {
    fn label(&self) -> &str {
        "oai-events"
    }

    async fn send_text(&self, payload: String) -> Result<()> {
        self.sent.lock().unwrap().push(payload);
        Ok(())
    }
}

pub struct FakePeer {
    pub channel: Arc<FakeChannel>,
    pub remote: Arc<FakeStream>,
    pub events_tx: Mutex<Option<mpsc::UnboundedSender<PeerEvent>>>,
    pub added_streams: Mutex<Vec<String>>,
    pub remote_answer: Mutex<Option<String>>,
    pub offers: AtomicUsize,
    pub closed: AtomicUsize,
    /// Emit the remote track before the answer is applied.
    pub track_before_answer: AtomicBool,
    /// Emit the remote track as soon as the answer is applied.
    pub track_on_answer: AtomicBool,
    /// Delay data channel creation, keeping negotiation in flight.
    pub channel_delay_ms: AtomicU64,
}

impl FakePeer {
    pub fn emit(&self, event: PeerEvent) {
        if let Some(tx) = self.events_tx.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn emit_channel_message(&self, payload: &str) {
        self.emit(PeerEvent::DataChannelMessage {
            label: "oai-events".into(),
            payload: payload.into(),
        });
    }
}

#[async_trait]
impl PeerConnection for FakePeer {
    async fn add_stream(&self, stream: Arc<dyn MediaStream>) -> Result<()> {
        self.added_streams.lock().unwrap().push(stream.id().to_string());
        Ok(())
    }

    async fn create_data_channel(&self, label: &str) -> Result<Arc<dyn DataChannel>> {
        let delay = self.channel_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        *self.channel.label.lock().unwrap() = label.to_string();
        Ok(self.channel.clone())
    }

    async fn create_offer(&self) -> Result<String> {
        self.offers.fetch_add(1, Ordering::SeqCst);
        if self.track_before_answer.load(Ordering::SeqCst) {
            self.emit(PeerEvent::RemoteTrack(self.remote.clone()));
        }
        Ok(OFFER_SDP.to_string())
    }

    async fn set_remote_answer(&self, sdp: &str) -> Result<()> {
        *self.remote_answer.lock().unwrap() = Some(sdp.to_string());
        if self.track_on_answer.load(Ordering::SeqCst) {
            self.emit(PeerEvent::RemoteTrack(self.remote.clone()));
        }
        Ok(())
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakePeers {
    pub peer: Arc<FakePeer>,
    pub opens: AtomicUsize,
    pub ice_servers: Mutex<Vec<IceServer>>,
}

#[async_trait]
impl PeerConnector for FakePeers {
    async fn open(
        &self,
        ice_servers: &[IceServer],
    ) -> Result<(Arc<dyn PeerConnection>, mpsc::UnboundedReceiver<PeerEvent>)> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.ice_servers.lock().unwrap() = ice_servers.to_vec();
        let (tx, rx) = mpsc::unbounded_channel();
        *self.peer.events_tx.lock().unwrap() = Some(tx);
        Ok((self.peer.clone(), rx))
    }
}

/// Every fake wired together.
pub struct Harness {
    pub peers: Arc<FakePeers>,
    pub peer: Arc<FakePeer>,
    pub devices: Arc<FakeDevices>,
    pub output: Arc<FakeOutput>,
    pub analysers: Arc<FakeAnalysers>,
    pub channel: Arc<FakeChannel>,
    pub microphone: Arc<FakeStream>,
}

impl Harness {
    pub fn new() -> Self {
        let channel = Arc::new(FakeChannel::default());
        let peer = Arc::new(FakePeer {
            channel: channel.clone(),
            remote: FakeStream::new("remote"),
            events_tx: Mutex::new(None),
            added_streams: Mutex::new(Vec::new()),
            remote_answer: Mutex::new(None),
            offers: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
            track_before_answer: AtomicBool::new(true),
            track_on_answer: AtomicBool::new(false),
            channel_delay_ms: AtomicU64::new(0),
        });
        let microphone = FakeStream::new("microphone");
        Self {
            peers: Arc::new(FakePeers {
                peer: peer.clone(),
                opens: AtomicUsize::new(0),
                ice_servers: Mutex::new(Vec::new()),
            }),
            peer,
            devices: Arc::new(FakeDevices {
                microphone: microphone.clone(),
                deny: AtomicBool::new(false),
                requests: AtomicUsize::new(0),
            }),
            output: Arc::new(FakeOutput::default()),
            analysers: Arc::new(FakeAnalysers::default()),
            channel,
            microphone,
        }
    }

    pub fn platform(&self) -> MediaPlatform {
        MediaPlatform::builder()
            .peers(self.peers.clone())
            .devices(self.devices.clone())
            .output(self.output.clone())
            .analysers(self.analysers.clone())
            .build()
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
