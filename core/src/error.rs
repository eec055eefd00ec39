//! Error types for the JotForm API client.
//!
//! # Design
//! Every failure is returned to the caller as a value. Non-2xx HTTP responses
//! keep their raw status and body in `Http`, while a 2xx response whose
//! envelope carries a failing `responseCode` lands in `Api` with the server's
//! message. Transport failures are split into `Timeout` and `Transport` so
//! callers can decide whether a retry makes sense.

use thiserror::Error;

/// Errors returned by `JotformClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration is incomplete or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection, I/O or request construction failure.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {}", String::from_utf8_lossy(.body))]
    Http { status: u16, body: Vec<u8> },

    /// The envelope reported a failing `responseCode`.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The response body was not a valid envelope or XML document.
    #[error("decoding failed: {0}")]
    Decode(String),

    /// A caller-supplied value could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status or envelope response code, when the server produced one.
    pub fn status(&self) -> Option<i64> {
        match self {
            ApiError::Http { status, .. } => Some(i64::from(*status)),
            ApiError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
