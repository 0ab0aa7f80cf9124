//! CLI entry point for Superinterface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Superinterface CLI
#[derive(Parser, Debug)]
#[command(name = "superinterface", version, about = "Superinterface voice assistant client")]
pub struct Cli {
    /// Override the backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file (defaults to ~/.superinterface/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize speech through the backend TTS endpoint
    Tts(TtsArgs),
    /// Read reply-stream records (NDJSON) from stdin and show how each is routed
    Decode,
    /// Read realtime events (NDJSON) from stdin and show which are logged
    Filter,
}

/// Arguments for the `tts` subcommand.
#[derive(Parser, Debug)]
pub struct TtsArgs {
    /// Text to speak
    pub input: String,

    /// Output MP3 file
    #[arg(short, long, default_value = "speech.mp3")]
    pub out: PathBuf,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
