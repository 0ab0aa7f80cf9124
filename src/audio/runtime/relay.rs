//! Dispatch of reply-stream records into the data channel and thread hooks.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::audio::media::DataChannel;
use crate::context::SuperinterfaceContext;
use crate::error::{Result, SuperinterfaceError};
use crate::events::{StreamRecord, ThreadEvent, ThreadEventHandler};
use crate::ndjson::RecordResult;

/// Variable that carries the current thread id into later requests.
pub const THREAD_ID_VARIABLE: &str = "threadId";

/// Routes [`StreamRecord`]s for one session.
pub struct EventRelay {
    context: SuperinterfaceContext,
    channel: Arc<dyn DataChannel>,
    handler: Arc<dyn ThreadEventHandler>,
}

/// Counts from one [`EventRelay::pump`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpSummary {
    pub dispatched: usize,
    pub skipped: usize,
}

impl EventRelay {
    pub fn new(
        context: SuperinterfaceContext,
        channel: Arc<dyn DataChannel>,
        handler: Arc<dyn ThreadEventHandler>,
    ) -> Self {
        Self {
            context,
            channel,
            handler,
        }
    }

    /// Route one record.
    ///
    /// `openaiEvent` data is re-serialized onto the data channel;
    /// `threadEvent` data goes to the thread hooks and is never forwarded.
    pub async fn dispatch(&self, record: StreamRecord) -> Result<()> {
        match record {
            StreamRecord::OpenaiEvent(data) => {
                let payload = serde_json::to_string(&data)?;
                self.channel.send_text(payload).await
            }
            StreamRecord::ThreadEvent(data) => {
                self.handle_thread_event(ThreadEvent::from_payload(data)?).await
            }
        }
    }

    async fn handle_thread_event(&self, event: ThreadEvent) -> Result<()> {
        match event {
            ThreadEvent::ThreadCreated(thread) => {
                self.context.set_variable(THREAD_ID_VARIABLE, thread.id.clone());
                self.handler.thread_created(&thread).await
            }
            ThreadEvent::RunRequiresAction(run) => self.handler.run_requires_action(&run).await,
            ThreadEvent::Other { event } => {
                tracing::debug!(event = %event, "Ignoring thread event");
                Ok(())
            }
        }
    }

    /// Drain a record stream in arrival order.
    ///
    /// Malformed lines and failed dispatches are logged and skipped; a
    /// transport error ends the pump.
    pub async fn pump(
        &self,
        mut records: BoxStream<'static, RecordResult<StreamRecord>>,
    ) -> PumpSummary {
        let mut summary = PumpSummary::default();
        while let Some(item) = records.next().await {
            match item {
                Ok(record) => match self.dispatch(record).await {
                    Ok(()) => summary.dispatched += 1,
                    Err(error) => {
                        summary.skipped += 1;
                        tracing::error!(error = %error, "Failed to dispatch stream record");
                    }
                },
                Err(SuperinterfaceError::MalformedRecord { line, source }) => {
                    summary.skipped += 1;
                    tracing::error!(error = %source, line = %line, "JSON parse error");
                }
                Err(error) => {
                    tracing::error!(error = %error, "Event stream failed");
                    break;
                }
            }
        }
        summary
    }
}
