//! Speak new assistant messages through a TTS-backed player.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;

use super::media::AudioAnalyser;
use super::tts::TtsClient;
use crate::error::Result;
use crate::threads::SerializedMessage;

/// What to load into the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSource {
    pub url: Url,
    pub format: &'static str,
    pub autoplay: bool,
}

/// An audio player the application owns (HTML5 audio, rodio, ...).
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    fn is_playing(&self) -> bool;

    async fn load(&self, source: PlaybackSource) -> Result<()>;

    /// Build an analyser over the player's output graph.
    fn create_analyser(&self) -> Result<Arc<dyn AudioAnalyser>>;
}

/// Text that should be spoken for `message`, if any.
///
/// Text parts are joined with newlines; citation markers such as
/// `【4:0†source】` are removed.
pub fn speech_input(message: &SerializedMessage) -> Option<String> {
    static CITATION: OnceLock<Regex> = OnceLock::new();
    let citation =
        CITATION.get_or_init(|| Regex::new(r"【[^】]*】").expect("citation pattern is valid"));

    let joined = message
        .text_parts()
        .map(|text| text.value.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = citation.replace_all(&joined, "");
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Plays each assistant message at most once.
pub struct MessageAudio {
    player: Arc<dyn AudioPlayer>,
    tts: TtsClient,
    played: Mutex<HashSet<String>>,
    analyser_inited: AtomicBool,
    analyser: OnceLock<Arc<dyn AudioAnalyser>>,
}

impl MessageAudio {
    pub fn new(player: Arc<dyn AudioPlayer>, tts: TtsClient) -> Self {
        Self {
            player,
            tts,
            played: Mutex::new(HashSet::new()),
            analyser_inited: AtomicBool::new(false),
            analyser: OnceLock::new(),
        }
    }

    /// React to the latest thread message. Returns whether playback was
    /// requested.
    pub async fn sync(&self, latest: Option<&SerializedMessage>) -> Result<bool> {
        if self.player.is_playing() {
            return Ok(false);
        }
        let Some(message) = latest else {
            return Ok(false);
        };
        if !message.is_assistant() || self.was_played(&message.id) {
            return Ok(false);
        }
        let Some(input) = speech_input(message) else {
            return Ok(false);
        };

        if !self.mark_played(&message.id) {
            return Ok(false);
        }

        let source = PlaybackSource {
            url: self.tts.speech_url(&input)?,
            format: "mp3",
            autoplay: true,
        };
        tracing::debug!(message_id = %message.id, "Loading message audio");
        self.player.load(source).await?;
        Ok(true)
    }

    pub fn was_played(&self, message_id: &str) -> bool {
        self.played
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(message_id)
    }

    /// Number of messages ever queued for playback.
    pub fn played_count(&self) -> usize {
        self.played
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn mark_played(&self, message_id: &str) -> bool {
        self.played
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(message_id.to_string())
    }

    /// Analyser over the player output, built once after playback starts.
    pub fn visualization_analyser(&self) -> Option<Arc<dyn AudioAnalyser>> {
        if let Some(analyser) = self.analyser.get() {
            return Some(analyser.clone());
        }
        if !self.player.is_playing() || self.analyser_inited.swap(true, Ordering::SeqCst) {
            return None;
        }

        match self.player.create_analyser() {
            Ok(analyser) => Some(self.analyser.get_or_init(|| analyser).clone()),
            Err(error) => {
                tracing::warn!(error = %error, "Could not build message audio analyser");
                None
            }
        }
    }
}
