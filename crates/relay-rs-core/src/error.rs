//! Error types for the message handling pipeline.

use relay_rs_sheets::SheetsError;
use thiserror::Error;

/// Errors raised while handling one inbound event.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Spreadsheet read or write failed.
    #[error("sheets error: {0}")]
    Sheets(#[from] SheetsError),
    /// Downloading media from the transport failed.
    #[error("media error: {0}")]
    Media(String),
    /// Local image storage failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Text generation failed or returned nothing.
    #[error("llm error: {0}")]
    Llm(String),
}
