//! Backend endpoints of the WebRTC audio runtime.

use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use crate::context::SuperinterfaceContext;
use crate::error::{Result, SuperinterfaceError};
use crate::events::StreamRecord;
use crate::http::{ensure_success, shared_client};
use crate::ndjson::{decode_stream, RecordResult};
use crate::util::timeout::with_timeout;

const OFFER_PATH: &str = "/audio-runtimes/webrtc";
const EVENTS_PATH: &str = "/audio-runtimes/webrtc/events";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for SDP exchange and event logging.
#[derive(Debug, Clone)]
pub struct WebrtcSignaling {
    context: SuperinterfaceContext,
    timeout: Duration,
}

impl WebrtcSignaling {
    pub fn new(context: SuperinterfaceContext) -> Self {
        Self {
            context,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound on each request until response headers (and, for the offer,
    /// the answer body) arrive.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn context(&self) -> &SuperinterfaceContext {
        &self.context
    }

    /// Post an SDP offer and return the SDP answer.
    pub async fn exchange_offer(&self, offer_sdp: &str) -> Result<String> {
        let url = self.context.endpoint(OFFER_PATH)?;

        with_timeout(self.timeout, async {
            let response = shared_client()
                .post(url)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/sdp"))
                .body(offer_sdp.to_string())
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(SuperinterfaceError::Signaling(format!(
                    "Server responded with status {}",
                    response.status().as_u16()
                )));
            }

            let answer = response.text().await?;
            if answer.trim().is_empty() {
                return Err(SuperinterfaceError::Signaling(
                    "Server returned an empty SDP answer".into(),
                ));
            }
            Ok(answer)
        })
        .await
    }

    /// Post one realtime event verbatim and decode the NDJSON reply stream.
    pub async fn post_event(
        &self,
        payload: String,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, RecordResult<StreamRecord>>> {
        let url = self.context.endpoint(EVENTS_PATH)?;

        let response = with_timeout(self.timeout, async {
            let response = shared_client()
                .post(url)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(payload)
                .send()
                .await?;
            ensure_success(response).await
        })
        .await?;

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(SuperinterfaceError::from));
        Ok(decode_stream(bytes, cancel))
    }
}
