//! Shared HTTP client and status handling.

use std::sync::OnceLock;

use reqwest::header::CONTENT_TYPE;

use crate::error::SuperinterfaceError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// No overall request timeout is set: event and TTS bodies are long-lived
/// streams. Callers bound the request phase with [`crate::util::timeout`].
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Map a non-success status and body to an error.
pub fn status_to_error(status: u16, body: &str) -> SuperinterfaceError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            format!("Server responded with status {status}")
        } else {
            body.to_string()
        }
    });
    SuperinterfaceError::api(status, message)
}

/// Return the response if it is 2xx, otherwise an API error carrying the body.
pub async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, SuperinterfaceError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(status_to_error(status, &body))
}

/// Lower-cased content type of a response, empty when absent.
pub fn content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn extract_error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|m| m.as_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_to_error_prefers_json_message() {
        let err = status_to_error(400, r#"{"error":{"message":"bad variables"}}"#);
        assert!(matches!(
            err,
            SuperinterfaceError::Api { status: 400, message } if message == "bad variables"
        ));
    }

    #[test]
    fn status_to_error_accepts_string_error() {
        let err = status_to_error(401, r#"{"error":"invalid public api key"}"#);
        assert!(matches!(
            err,
            SuperinterfaceError::Api { message, .. } if message == "invalid public api key"
        ));
    }

    #[test]
    fn status_to_error_empty_body_names_status() {
        let err = status_to_error(503, "");
        assert_eq!(
            err.to_string(),
            "API error (status 503): Server responded with status 503"
        );
    }
}
