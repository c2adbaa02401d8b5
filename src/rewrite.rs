//! Client for the AI rewrite proxy.
//!
//! The proxy is an opaque text-transform service: it accepts a note's title
//! and content plus a mode and answers with a suggested rewrite. Credentials
//! for the upstream model live on the proxy, never here. Failures come back
//! as a non-2xx status with an `{error, detail?}` body.

use std::time::Duration;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{NoteError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How the proxy should transform the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    /// Expand and elaborate while preserving meaning and tone.
    Expand,
    /// Clean up clarity and grammar without changing the meaning.
    Cleanup,
}

/// Request body of the rewrite proxy.
#[derive(Debug, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub mode: RewriteMode,
    pub title: String,
    pub text: String,
}

/// Success body of the rewrite proxy.
#[derive(Debug, Serialize, Deserialize)]
pub struct RewriteResponse {
    pub suggestion: String,
}

/// Error body of the rewrite proxy, carried with a non-2xx status.
#[derive(Debug, Serialize, Deserialize)]
pub struct RewriteErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// HTTP client for the rewrite proxy endpoint.
pub struct RewriteClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RewriteClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| NoteError::RewriteFailed {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Requests a rewrite of `text` (with `title` as context) and returns
    /// the suggestion. Proxy-reported failures are surfaced with the
    /// proxy's own error message, detail appended when present.
    pub async fn rewrite(&self, mode: RewriteMode, title: &str, text: &str) -> Result<String> {
        debug!("Requesting {:?} rewrite from {}", mode, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RewriteRequest {
                mode,
                title: title.to_string(),
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| NoteError::RewriteFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<RewriteErrorBody>().await {
                Ok(body) => match body.detail {
                    Some(detail) => format!("{} ({})", body.error, detail),
                    None => body.error,
                },
                Err(_) => format!("rewrite proxy returned {}", status),
            };
            return Err(NoteError::RewriteFailed { message });
        }

        let body: RewriteResponse =
            response
                .json()
                .await
                .map_err(|e| NoteError::RewriteFailed {
                    message: e.to_string(),
                })?;
        Ok(body.suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_lowercase_mode() {
        let json = serde_json::to_value(RewriteRequest {
            mode: RewriteMode::Expand,
            title: "T".to_string(),
            text: "body".to_string(),
        })
        .unwrap();
        assert_eq!(json["mode"], "expand");
        assert_eq!(json["title"], "T");
        assert_eq!(json["text"], "body");
    }

    #[test]
    fn cleanup_mode_roundtrips() {
        let mode: RewriteMode = serde_json::from_str("\"cleanup\"").unwrap();
        assert_eq!(mode, RewriteMode::Cleanup);
    }

    #[test]
    fn error_body_detail_is_optional() {
        let body: RewriteErrorBody =
            serde_json::from_str(r#"{"error": "Invalid mode."}"#).unwrap();
        assert_eq!(body.error, "Invalid mode.");
        assert!(body.detail.is_none());

        let body: RewriteErrorBody = serde_json::from_str(
            r#"{"error": "Upstream request failed.", "detail": "upstream 503"}"#,
        )
        .unwrap();
        assert_eq!(body.detail.as_deref(), Some("upstream 503"));
    }

    #[test]
    fn success_body_carries_the_suggestion() {
        let body: RewriteResponse =
            serde_json::from_str(r#"{"suggestion": "better text"}"#).unwrap();
        assert_eq!(body.suggestion, "better text");
    }
}
