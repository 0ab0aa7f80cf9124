//! Observable runtime flags.

use serde::Serialize;
use strum::{Display, EnumString};

/// Microphone recorder status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecorderStatus {
    #[default]
    Idle,
    Recording,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UserState {
    pub is_pending: bool,
    pub recorder_status: RecorderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssistantState {
    pub playing: bool,
    pub paused: bool,
    pub is_pending: bool,
    pub is_ready: bool,
    pub is_audio_played: bool,
}

impl Default for AssistantState {
    fn default() -> Self {
        Self {
            playing: false,
            paused: false,
            is_pending: true,
            is_ready: false,
            is_audio_played: false,
        }
    }
}

/// Snapshot of everything a UI needs to render the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RuntimeState {
    pub user: UserState,
    pub assistant: AssistantState,
}

impl RuntimeState {
    /// Idle values after a failed session attempt.
    pub(crate) fn reset_after_failure(&mut self) {
        self.user.is_pending = false;
        self.user.recorder_status = RecorderStatus::Stopped;
        self.assistant = AssistantState {
            playing: false,
            paused: false,
            is_pending: false,
            is_ready: false,
            is_audio_played: false,
        };
    }

    pub(crate) fn remote_track_attached(&mut self) {
        self.assistant.is_pending = false;
        self.assistant.playing = true;
        self.assistant.paused = false;
        self.assistant.is_audio_played = true;
    }

    pub(crate) fn session_ready(&mut self) {
        self.user.is_pending = false;
        self.assistant.is_pending = false;
        self.assistant.is_ready = true;
        self.assistant.playing = true;
    }

    pub(crate) fn resumed(&mut self) {
        self.assistant.paused = false;
        self.assistant.playing = true;
        if self.user.recorder_status != RecorderStatus::Stopped {
            self.user.recorder_status = RecorderStatus::Recording;
        }
    }

    pub(crate) fn paused(&mut self) {
        self.assistant.paused = true;
        self.assistant.playing = false;
        if self.user.recorder_status != RecorderStatus::Stopped {
            self.user.recorder_status = RecorderStatus::Paused;
        }
    }
}
