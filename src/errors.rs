//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all relay failure modes.
///
/// Every relay-path variant is absorbed at the point of occurrence and
/// converted into a degraded continuation or a silent no-op; only
/// [`AppError::Config`] at startup is process-fatal.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// An optional credential is absent and the feature that needs it is
    /// disabled. Expected and recoverable, never fatal.
    ConfigurationMissing(String),
    /// Discord Gateway connection or protocol failure.
    Gateway(String),
    /// Non-success HTTP status while fetching a source attachment.
    FetchFailed(u16),
    /// Non-success HTTP status while uploading to the image service.
    UploadFailed(u16),
    /// An outbound message post was rejected with a non-success status.
    PostFailed {
        /// HTTP status code returned by the destination.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },
    /// Network-level failure (timeout, connection refused, DNS).
    TransportFailed(String),
    /// Malformed response body or missing expected JSON key.
    ParseFailed(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::ConfigurationMissing(msg) => write!(f, "configuration missing: {msg}"),
            Self::Gateway(msg) => write!(f, "gateway: {msg}"),
            Self::FetchFailed(status) => write!(f, "fetch failed: status {status}"),
            Self::UploadFailed(status) => write!(f, "upload failed: status {status}"),
            Self::PostFailed { status, body } => {
                write!(f, "post failed: status {status}: {body}")
            }
            Self::TransportFailed(msg) => write!(f, "transport failed: {msg}"),
            Self::ParseFailed(msg) => write!(f, "parse failed: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::TransportFailed(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailed(err.to_string())
    }
}
