//! Configuration system (layered: code > env > config file > defaults).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SuperinterfaceError};

pub const DEFAULT_BASE_URL: &str = "https://superinterface.ai/api/cloud";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Public STUN servers used for ICE candidate gathering. No TURN relay.
pub const DEFAULT_ICE_SERVERS: [&str; 6] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
    "stun:stun2.l.google.com:19302",
    "stun:stun3.l.google.com:19302",
    "stun:stun4.l.google.com:19302",
    "stun:global.stun.twilio.com:3478",
];

/// One ICE server entry handed to the peer connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: String,
}

impl IceServer {
    pub fn new(urls: impl Into<String>) -> Self {
        Self { urls: urls.into() }
    }
}

/// Client configuration for a Superinterface backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperinterfaceConfig {
    pub base_url: String,
    pub public_api_key: Option<String>,
    pub timeout_secs: u64,
    pub ice_servers: Vec<IceServer>,
    /// Initial template variables (assistant id, thread id, ...).
    pub variables: BTreeMap<String, String>,
}

impl Default for SuperinterfaceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            public_api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ice_servers: DEFAULT_ICE_SERVERS.iter().map(|u| IceServer::new(*u)).collect(),
            variables: BTreeMap::new(),
        }
    }
}

impl SuperinterfaceConfig {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| SuperinterfaceError::Configuration(e.to_string()))
    }

    /// Load a TOML config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// `~/.superinterface/config.toml`.
    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".superinterface"))
            .unwrap_or_else(|| PathBuf::from(".superinterface"))
            .join("config.toml")
    }

    /// Default config file, then environment overrides (`.env` honored).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::load(&Self::default_path())?;
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `SUPERINTERFACE_*` environment overrides in place.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("SUPERINTERFACE_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(key) = std::env::var("SUPERINTERFACE_PUBLIC_API_KEY") {
            self.public_api_key = Some(key);
        }
        if let Ok(raw) = std::env::var("SUPERINTERFACE_TIMEOUT_SECS") {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                SuperinterfaceError::Configuration(format!(
                    "SUPERINTERFACE_TIMEOUT_SECS must be an integer, got '{raw}'"
                ))
            })?;
        }
        Ok(())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_public_api_key(mut self, key: impl Into<String>) -> Self {
        self.public_api_key = Some(key.into());
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the config is usable for requests.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(SuperinterfaceError::Configuration(
                "Base URL cannot be empty".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(SuperinterfaceError::Configuration(
                "Timeout must be at least one second".into(),
            ));
        }
        Ok(())
    }
}
