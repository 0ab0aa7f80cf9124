//! Command handlers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use super::{Cli, TtsArgs};
use crate::audio::media::DataChannel;
use crate::audio::runtime::EventRelay;
use crate::audio::TtsClient;
use crate::config::SuperinterfaceConfig;
use crate::context::SuperinterfaceContext;
use crate::error::{Result, SuperinterfaceError};
use crate::events::{RealtimeEvent, ThreadEventHandler};
use crate::ndjson::{decode_stream, RecordResult};
use crate::threads::{Run, Thread};

/// Resolve config: file, then env, then CLI overrides.
pub fn load_config(cli: &Cli) -> Result<SuperinterfaceConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = SuperinterfaceConfig::load(path)?;
            config.apply_env()?;
            config
        }
        None => SuperinterfaceConfig::from_env()?,
    };
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

pub async fn handle_tts(config: &SuperinterfaceConfig, args: &TtsArgs) -> Result<()> {
    let client =
        TtsClient::new(SuperinterfaceContext::from_config(config)).with_timeout(config.timeout());
    let audio = client.synthesize(&args.input).await?;
    tokio::fs::write(&args.out, &audio).await?;
    eprintln!("Wrote {} bytes to {}", audio.len(), args.out.display());
    Ok(())
}

/// Route reply-stream records from stdin through a printing relay.
pub async fn handle_decode(config: &SuperinterfaceConfig) -> Result<()> {
    let context = SuperinterfaceContext::from_config(config);
    let relay = EventRelay::new(
        context.clone(),
        Arc::new(StdoutChannel),
        Arc::new(StdoutThreadHandler),
    );

    let summary = relay.pump(read_records(tokio::io::stdin())).await;
    eprintln!(
        "{} dispatched, {} skipped",
        summary.dispatched, summary.skipped
    );
    if let Some(thread_id) = context.variable(crate::audio::runtime::THREAD_ID_VARIABLE) {
        eprintln!("threadId = {thread_id}");
    }
    Ok(())
}

/// Print which realtime events from stdin would reach the event log.
pub async fn handle_filter() -> Result<()> {
    let mut events = decode_stream::<Value, _, _, _>(
        stdin_chunks(tokio::io::stdin()),
        CancellationToken::new(),
    );
    while let Some(item) = events.next().await {
        match item {
            Ok(payload) => match RealtimeEvent::from_payload(&payload) {
                Some(event) => {
                    let verdict = if event.is_logged() { "log" } else { "skip" };
                    println!("{verdict}\t{}", describe(&payload));
                }
                None => println!("skip\t(no type)"),
            },
            Err(SuperinterfaceError::MalformedRecord { line, .. }) => {
                eprintln!("malformed: {line}");
            }
            Err(error) => return Err(error),
        }
    }
    Ok(())
}

fn describe(payload: &Value) -> String {
    let event_type = payload.get("type").and_then(Value::as_str).unwrap_or_default();
    match payload.pointer("/response/status").and_then(Value::as_str) {
        Some(status) => format!("{event_type} ({status})"),
        None => event_type.to_string(),
    }
}

fn read_records<R>(reader: R) -> BoxStream<'static, RecordResult<crate::events::StreamRecord>>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    decode_stream(stdin_chunks(reader), CancellationToken::new())
}

fn stdin_chunks<R>(mut reader: R) -> BoxStream<'static, std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    Box::pin(async_stream::stream! {
        let mut buf = vec![0u8; 8192];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => yield Ok(buf[..n].to_vec()),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    })
}

struct StdoutChannel;

#[async_trait]
impl DataChannel for StdoutChannel {
    fn label(&self) -> &str {
        crate::audio::runtime::EVENTS_CHANNEL_LABEL
    }

    async fn send_text(&self, payload: String) -> Result<()> {
        println!("forward\t{payload}");
        Ok(())
    }
}

struct StdoutThreadHandler;

#[async_trait]
impl ThreadEventHandler for StdoutThreadHandler {
    async fn thread_created(&self, thread: &Thread) -> Result<()> {
        println!("thread.created\t{}", thread.id);
        Ok(())
    }

    async fn run_requires_action(&self, run: &Run) -> Result<()> {
        let names: Vec<&str> = run
            .pending_tool_calls()
            .iter()
            .map(|call| call.function.name.as_str())
            .collect();
        println!("thread.run.requires_action\t{}\t{}", run.id, names.join(","));
        Ok(())
    }
}
