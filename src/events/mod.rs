//! Event vocabularies crossing the session boundary.
//!
//! - [`RealtimeEvent`]: OpenAI realtime-session events seen on the data channel.
//! - [`ThreadEvent`]: application thread lifecycle events from the backend.
//! - [`StreamRecord`]: one line of the backend's NDJSON reply stream.

pub mod realtime;
pub mod record;
pub mod thread;

pub use realtime::{RealtimeEvent, ResponseStatus, LOGGED_EVENT_TYPES};
pub use record::StreamRecord;
pub use thread::{LoggingThreadEventHandler, ThreadEvent, ThreadEventHandler};
