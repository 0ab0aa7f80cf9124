//! Newline-delimited JSON framing.
//!
//! [`NdjsonDecoder`] accepts arbitrary byte chunks and yields one parsed
//! record per `\n`-terminated line. Partial lines are buffered as bytes, so a
//! chunk boundary may fall anywhere, including inside a multi-byte character.
//! [`decode_stream`] lifts the decoder over an async byte stream.

use std::marker::PhantomData;

use futures::stream::{BoxStream, Stream};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::SuperinterfaceError;

/// One decoded line: the record, or the reason this line was skipped.
pub type RecordResult<T> = Result<T, SuperinterfaceError>;

/// Restartable line-framing decoder.
#[derive(Debug)]
pub struct NdjsonDecoder<T> {
    buffer: Vec<u8>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Default for NdjsonDecoder<T> {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> NdjsonDecoder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns the records completed by it, in order.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<RecordResult<T>> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete
            .split(|b| *b == b'\n')
            .filter_map(parse_line)
            .collect()
    }

    /// Number of buffered bytes still waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any partial line, returning how many bytes were dropped.
    pub fn reset(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }
}

fn parse_line<T: DeserializeOwned>(raw: &[u8]) -> Option<RecordResult<T>> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(line).map_err(|source| SuperinterfaceError::MalformedRecord {
            line: line.to_string(),
            source,
        }),
    )
}

/// Decode a byte stream into a lazy stream of records.
///
/// Ends when the input ends, after yielding the first transport error, or
/// when `cancel` fires. An unterminated trailing line at end of input is
/// dropped.
pub fn decode_stream<T, S, B, E>(
    input: S,
    cancel: CancellationToken,
) -> BoxStream<'static, RecordResult<T>>
where
    T: DeserializeOwned + Send + 'static,
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Into<SuperinterfaceError> + Send,
{
    let stream = async_stream::stream! {
        let mut decoder = NdjsonDecoder::<T>::new();
        let mut input = std::pin::pin!(input);

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(pending = decoder.pending(), "NDJSON stream cancelled");
                    break;
                }
                chunk = input.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    for record in decoder.decode(bytes.as_ref()) {
                        yield record;
                    }
                }
                Some(Err(e)) => {
                    yield Err(e.into());
                    break;
                }
                None => {
                    let dropped = decoder.reset();
                    if dropped > 0 {
                        tracing::debug!(
                            bytes = dropped,
                            "Dropping unterminated trailing NDJSON line"
                        );
                    }
                    break;
                }
            }
        }
    };
    Box::pin(stream)
}
