//! Backend text-to-speech endpoint (`GET {baseUrl}/tts?input=...`).

use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Url;

use crate::context::SuperinterfaceContext;
use crate::error::{Result, SuperinterfaceError};
use crate::http::{content_type, ensure_success, shared_client};
use crate::util::timeout::with_timeout;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the backend TTS endpoint. Responses are MP3 streams.
#[derive(Debug, Clone)]
pub struct TtsClient {
    context: SuperinterfaceContext,
    timeout: Duration,
}

impl TtsClient {
    pub fn new(context: SuperinterfaceContext) -> Self {
        Self {
            context,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound on the time until response headers arrive.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL that streams speech for `input`.
    pub fn speech_url(&self, input: &str) -> Result<Url> {
        if input.trim().is_empty() {
            return Err(SuperinterfaceError::InvalidArgument(
                "Speech input cannot be empty".into(),
            ));
        }
        let mut url = self.context.url("/tts")?;
        url.query_pairs_mut().append_pair("input", input);
        Ok(url)
    }

    /// Request speech for `input` and stream the MP3 bytes.
    pub async fn stream(&self, input: &str) -> Result<BoxStream<'static, Result<Bytes>>> {
        let url = self.speech_url(input)?;

        let response = with_timeout(self.timeout, async {
            let response = shared_client().get(url).send().await?;
            ensure_success(response).await
        })
        .await?;

        let mime = content_type(&response);
        if mime.starts_with("application/json") {
            return Err(SuperinterfaceError::InvalidState(
                "Expected audio payload, got JSON response".into(),
            ));
        }
        tracing::debug!(content_type = %mime, "Streaming speech");

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(SuperinterfaceError::from))
            .boxed())
    }

    /// Request speech for `input` and collect the whole MP3 payload.
    pub async fn synthesize(&self, input: &str) -> Result<Vec<u8>> {
        let mut stream = self.stream(input).await?;
        let mut audio = Vec::new();
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk?);
        }
        Ok(audio)
    }
}
