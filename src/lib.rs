//! Superinterface voice assistant client.
//!
//! Embeds a Superinterface assistant outside the browser: a WebRTC realtime
//! audio runtime that negotiates with the backend and relays its event
//! stream, text-to-speech playback of assistant messages, and the thread
//! models needed to present them.
//!
//! # Quick Start
//!
//! ```no_run
//! use superinterface::prelude::*;
//! use superinterface::audio::runtime::{MediaPlatform, RuntimeOptions};
//!
//! # async fn example(platform: MediaPlatform) -> superinterface::error::Result<()> {
//! let config = SuperinterfaceConfig::from_env()?.with_variable("assistantId", "asst_123");
//! let runtime = WebrtcAudioRuntime::new(platform, RuntimeOptions::from_config(&config));
//!
//! runtime.start().await?;
//! runtime.pause();
//! runtime.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod http;
pub mod ndjson;
pub mod prelude;
pub mod threads;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
