//! Spreadsheet-backed message log.
//!
//! Rows are appended through the Google Sheets values API when service-account
//! credentials are configured. Reads use the values API with an optional API
//! key and fall back to the public CSV export.

pub mod auth;
pub mod client;
pub mod csv;
pub mod error;
pub mod model;
pub mod store;

/// Token sources for authenticated writes.
pub use auth::{ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource};
/// Google Sheets implementation of the store.
pub use client::GoogleSheetsClient;
/// Sheets error type.
pub use error::SheetsError;
/// Row and append result models.
pub use model::{AppendConfirmation, AppendOutcome, SheetRow};
/// Store abstraction used by the dispatcher.
pub use store::SheetStore;
