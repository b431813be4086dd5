//! Error types for spreadsheet operations.

/// Errors returned by the sheets client and token sources.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Remote answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// Spreadsheet id is not configured.
    #[error("spreadsheet id is not configured")]
    MissingSpreadsheet,
    /// Service-account credentials could not be loaded or used.
    #[error("credentials error: {0}")]
    Credentials(String),
    /// JWT signing failed.
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Response or credential decoding failed.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// Building a request URL failed.
    #[error("invalid url: {0}")]
    Url(String),
}
