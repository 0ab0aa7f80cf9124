//! The session bridge: negotiation, playback control, inbound relay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bon::Builder;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::relay::EventRelay;
use super::signaling::WebrtcSignaling;
use super::state::{RecorderStatus, RuntimeState};
use crate::audio::media::{
    AnalyserFactory, AudioAnalyser, AudioOutput, DataChannel, MediaDevices, MediaStream,
    PeerConnection, PeerConnector, PeerEvent,
};
use crate::config::{IceServer, SuperinterfaceConfig};
use crate::context::SuperinterfaceContext;
use crate::error::{Result, SuperinterfaceError};
use crate::events::{LoggingThreadEventHandler, RealtimeEvent, ThreadEventHandler};

/// Label of the data channel carrying realtime-session events.
pub const EVENTS_CHANNEL_LABEL: &str = "oai-events";

/// Platform implementations the runtime drives.
#[derive(Clone, Builder)]
pub struct MediaPlatform {
    pub peers: Arc<dyn PeerConnector>,
    pub devices: Arc<dyn MediaDevices>,
    pub output: Arc<dyn AudioOutput>,
    pub analysers: Arc<dyn AnalyserFactory>,
}

/// Session options.
#[derive(Clone, Builder)]
pub struct RuntimeOptions {
    pub context: SuperinterfaceContext,
    #[builder(default = SuperinterfaceConfig::default().ice_servers)]
    pub ice_servers: Vec<IceServer>,
    #[builder(default = Duration::from_secs(60))]
    pub timeout: Duration,
    #[builder(default = Arc::new(LoggingThreadEventHandler) as Arc<dyn ThreadEventHandler>)]
    pub thread_handler: Arc<dyn ThreadEventHandler>,
}

impl RuntimeOptions {
    pub fn from_config(config: &SuperinterfaceConfig) -> Self {
        Self {
            context: SuperinterfaceContext::from_config(config),
            ice_servers: config.ice_servers.clone(),
            timeout: config.timeout(),
            thread_handler: Arc::new(LoggingThreadEventHandler),
        }
    }
}

#[derive(Default)]
struct Resources {
    peer: Option<Arc<dyn PeerConnection>>,
    local_stream: Option<Arc<dyn MediaStream>>,
    remote_stream: Option<Arc<dyn MediaStream>>,
    user_analyser: Option<Arc<dyn AudioAnalyser>>,
    assistant_analyser: Option<Arc<dyn AudioAnalyser>>,
    /// Negotiation finished successfully.
    ready: bool,
    /// Set once a caller has taken the remote stream to build its analyser.
    assistant_analyser_claimed: bool,
}

impl Resources {
    /// Hand out the remote stream for analyser construction, at most once
    /// and only after negotiation finished.
    fn claim_assistant_analyser(&mut self) -> Option<Arc<dyn MediaStream>> {
        if !self.ready || self.assistant_analyser_claimed {
            return None;
        }
        let remote = self.remote_stream.clone()?;
        self.assistant_analyser_claimed = true;
        Some(remote)
    }
}

struct Inner {
    platform: MediaPlatform,
    signaling: WebrtcSignaling,
    thread_handler: Arc<dyn ThreadEventHandler>,
    ice_servers: Vec<IceServer>,
    started: AtomicBool,
    failed: AtomicBool,
    disposed: AtomicBool,
    cancel: CancellationToken,
    state: watch::Sender<RuntimeState>,
    resources: Mutex<Resources>,
}

/// A realtime voice session with the Superinterface backend.
///
/// Created idle; the first [`start`](Self::start) negotiates the connection.
/// Call [`dispose`](Self::dispose) when done. Dropping the runtime cancels
/// in-flight relay work but cannot close the peer connection.
pub struct WebrtcAudioRuntime {
    inner: Arc<Inner>,
}

impl WebrtcAudioRuntime {
    pub fn new(platform: MediaPlatform, options: RuntimeOptions) -> Self {
        let (state, _) = watch::channel(RuntimeState::default());
        Self {
            inner: Arc::new(Inner {
                platform,
                signaling: WebrtcSignaling::new(options.context).with_timeout(options.timeout),
                thread_handler: options.thread_handler,
                ice_servers: options.ice_servers,
                started: AtomicBool::new(false),
                failed: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                state,
                resources: Mutex::new(Resources::default()),
            }),
        }
    }

    /// Start (once) and resume the session.
    ///
    /// The first call negotiates the peer connection. If that fails every
    /// flag is reset, the peer connection is closed and the error is
    /// returned; later calls fail without retrying. A new runtime is needed
    /// for another attempt. Calls made while negotiation is still running
    /// return immediately and leave resuming to the negotiating call.
    pub async fn start(&self) -> Result<()> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(SuperinterfaceError::InvalidState(
                "Audio runtime has been disposed".into(),
            ));
        }
        if self.inner.failed.load(Ordering::SeqCst) {
            return Err(SuperinterfaceError::InvalidState(
                "Realtime session failed to start".into(),
            ));
        }

        if !self.inner.started.swap(true, Ordering::SeqCst) {
            let result = tokio::select! {
                biased;
                _ = self.inner.cancel.cancelled() => Err(SuperinterfaceError::Cancelled),
                result = self.inner.init_session() => result,
            };
            if let Err(error) = result {
                tracing::error!(error = %error, "Error initializing realtime session");
                self.inner.fail().await;
                return Err(error);
            }
        } else if !self.inner.is_ready() {
            tracing::debug!("Realtime session is still negotiating");
            return Ok(());
        }

        self.inner.update(RuntimeState::resumed);

        if let Err(error) = self.inner.platform.output.play().await {
            tracing::error!(error = %error, "Assistant play error");
        }
        if let Some(local) = self.inner.local_stream() {
            local.set_audio_enabled(true);
        }
        Ok(())
    }

    /// Alias of [`start`](Self::start).
    pub async fn resume(&self) -> Result<()> {
        self.start().await
    }

    /// Alias of [`start`](Self::start).
    pub async fn play(&self) -> Result<()> {
        self.start().await
    }

    /// Mute the microphone and mark the assistant paused. No-op until the
    /// session has finished negotiating.
    pub fn pause(&self) {
        if !self.inner.is_ready() {
            return;
        }
        self.inner.update(RuntimeState::paused);
        if let Some(local) = self.inner.local_stream() {
            local.set_audio_enabled(false);
        }
    }

    /// Alias of [`pause`](Self::pause).
    pub fn stop(&self) {
        self.pause();
    }

    /// Tear the session down. Only the first call has any effect.
    pub async fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.cancel.cancel();

        let peer = self.inner.resources().peer.take();
        if let Some(peer) = peer {
            peer.close().await;
        }
        if self.inner.started.load(Ordering::SeqCst) {
            self.inner.platform.output.set_source(None);
        }
        tracing::debug!("Audio runtime disposed");
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RuntimeState {
        *self.inner.state.borrow()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<RuntimeState> {
        self.inner.state.subscribe()
    }

    /// Analyser on the microphone stream.
    pub fn user_analyser(&self) -> Option<Arc<dyn AudioAnalyser>> {
        self.inner.resources().user_analyser.clone()
    }

    /// Analyser on the remote assistant stream.
    pub fn assistant_analyser(&self) -> Option<Arc<dyn AudioAnalyser>> {
        self.inner.resources().assistant_analyser.clone()
    }

    /// Variables and base URL used by this session.
    pub fn context(&self) -> &SuperinterfaceContext {
        self.inner.signaling.context()
    }
}

impl Drop for WebrtcAudioRuntime {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

impl Inner {
    fn resources(&self) -> MutexGuard<'_, Resources> {
        self.resources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_ready(&self) -> bool {
        self.resources().ready
    }

    /// Mark the runtime failed, stop its tasks and close the peer.
    async fn fail(&self) {
        self.failed.store(true, Ordering::SeqCst);
        self.cancel.cancel();
        self.update(RuntimeState::reset_after_failure);

        let peer = self.resources().peer.take();
        if let Some(peer) = peer {
            peer.close().await;
        }
    }

    fn local_stream(&self) -> Option<Arc<dyn MediaStream>> {
        self.resources().local_stream.clone()
    }

    fn update(&self, modify: impl FnOnce(&mut RuntimeState)) {
        self.state.send_modify(modify);
    }

    async fn init_session(self: &Arc<Self>) -> Result<()> {
        self.update(|state| state.user.is_pending = true);

        let (peer, peer_events) = self.platform.peers.open(&self.ice_servers).await?;
        self.resources().peer = Some(Arc::clone(&peer));

        let channel = peer.create_data_channel(EVENTS_CHANNEL_LABEL).await?;
        self.spawn_peer_events(peer_events, channel);

        let microphone = self.platform.devices.microphone().await?;
        self.resources().local_stream = Some(Arc::clone(&microphone));
        peer.add_stream(Arc::clone(&microphone)).await?;

        self.update(|state| state.user.recorder_status = RecorderStatus::Idle);

        let offer = peer.create_offer().await?;
        let answer = self.signaling.exchange_offer(&offer).await?;
        peer.set_remote_answer(&answer).await?;

        self.build_user_analyser();
        let remote = {
            let mut resources = self.resources();
            resources.ready = true;
            resources.claim_assistant_analyser()
        };
        match remote {
            Some(remote) => self.build_assistant_analyser(&remote),
            None => {
                tracing::debug!("Remote stream not attached yet; assistant analyser deferred")
            }
        }
        self.update(RuntimeState::session_ready);
        tracing::info!("Realtime session established");
        Ok(())
    }

    fn spawn_peer_events(
        self: &Arc<Self>,
        mut events: mpsc::UnboundedReceiver<PeerEvent>,
        channel: Arc<dyn DataChannel>,
    ) {
        let inner = Arc::clone(self);
        let relay = Arc::new(EventRelay::new(
            self.signaling.context().clone(),
            channel,
            Arc::clone(&self.thread_handler),
        ));
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                match event {
                    PeerEvent::RemoteTrack(stream) => inner.attach_remote(stream),
                    PeerEvent::DataChannelMessage { label, payload } => {
                        if label == EVENTS_CHANNEL_LABEL {
                            inner.forward_inbound(payload, &relay);
                        } else {
                            tracing::debug!(
                                label = %label,
                                "Ignoring message on unknown data channel"
                            );
                        }
                    }
                }
            }
        });
    }

    fn attach_remote(&self, stream: Arc<dyn MediaStream>) {
        tracing::debug!(stream_id = %stream.id(), "Remote track attached");
        let claimed = {
            let mut resources = self.resources();
            resources.remote_stream = Some(Arc::clone(&stream));
            resources.claim_assistant_analyser()
        };
        self.platform.output.set_source(Some(Arc::clone(&stream)));
        self.update(RuntimeState::remote_track_attached);

        if let Some(remote) = claimed {
            self.build_assistant_analyser(&remote);
        }
    }

    /// Post an allow-listed inbound event to the backend and relay its reply.
    fn forward_inbound(&self, payload: String, relay: &Arc<EventRelay>) {
        let value = match serde_json::from_str::<Value>(&payload) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(error = %error, "Dropping non-JSON data channel message");
                return;
            }
        };
        let Some(event) = RealtimeEvent::from_payload(&value) else {
            tracing::debug!("Dropping data channel message without a type");
            return;
        };
        if !event.is_logged() {
            return;
        }

        let signaling = self.signaling.clone();
        let relay = Arc::clone(relay);
        let cancel = self.cancel.child_token();

        tokio::spawn(async move {
            let records = tokio::select! {
                _ = cancel.cancelled() => return,
                records = signaling.post_event(payload, cancel.clone()) => records,
            };
            match records {
                Ok(records) => {
                    let summary = relay.pump(records).await;
                    tracing::debug!(
                        dispatched = summary.dispatched,
                        skipped = summary.skipped,
                        "Event reply stream finished"
                    );
                }
                Err(error) => tracing::error!(error = %error, "Failed to post realtime event"),
            }
        });
    }

    /// Best effort: failures only disable visualization.
    fn build_user_analyser(&self) {
        let Some(local) = self.local_stream() else {
            return;
        };
        match self.platform.analysers.create(&local) {
            Ok(analyser) => self.resources().user_analyser = Some(analyser),
            Err(error) => tracing::warn!(error = %error, "Could not build user analyser"),
        }
    }

    fn build_assistant_analyser(&self, remote: &Arc<dyn MediaStream>) {
        match self.platform.analysers.create(remote) {
            Ok(analyser) => self.resources().assistant_analyser = Some(analyser),
            Err(error) => tracing::warn!(error = %error, "Could not build assistant analyser"),
        }
    }
}
