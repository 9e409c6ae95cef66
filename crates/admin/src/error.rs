use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type AdminResult<T> = Result<T, AdminError>;

/// Failures raised while talking to the Kong Admin API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    /// The gateway answered with a 4xx or 5xx status.
    #[error("Kong Admin API returned {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
        body: Value,
    },

    #[error("request to Kong Admin API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON from Kong Admin API: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid Kong Admin URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Kong API token contains characters not allowed in an HTTP header")]
    InvalidApiToken,
}

impl AdminError {
    /// HTTP status of a gateway rejection, if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AdminError::Status { status, .. } => Some(*status),
            AdminError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Builds a status error from a raw response body.
    ///
    /// The message is the gateway's `message` field when the body is JSON,
    /// otherwise the body text itself.
    pub(crate) fn from_response(status: StatusCode, text: &str) -> Self {
        let body = serde_json::from_str::<Value>(text).unwrap_or_else(|_| {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        });
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    text.to_string()
                }
            });
        AdminError::Status {
            status,
            message,
            body,
        }
    }
}
