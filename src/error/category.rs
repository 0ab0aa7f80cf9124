//! Error classification.

use strum::{Display, EnumString};

/// Broad error category, following the session failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Microphone permission or capture device.
    Device,
    /// SDP exchange, peer negotiation, backend status codes.
    Signaling,
    /// A single malformed streamed record.
    Record,
    /// Analyser construction.
    Visualization,
    Network,
    Timeout,
    Configuration,
    Serialization,
    Cancelled,
    Unknown,
}
