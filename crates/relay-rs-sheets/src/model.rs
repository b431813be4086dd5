//! Row and append models.

use serde::{Deserialize, Serialize};

/// Two-column log row: sender id and message descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    pub user_id: String,
    pub message: String,
}

impl SheetRow {
    /// Create a row for the given sender.
    pub fn new(user_id: impl ToString, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.to_string(),
            message: message.into(),
        }
    }

    /// Cell values in column order.
    pub fn values(&self) -> [&str; 2] {
        [self.user_id.as_str(), self.message.as_str()]
    }
}

/// Confirmation returned by the remote append call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendConfirmation {
    /// Range the row landed in.
    pub updated_range: Option<String>,
    /// Number of rows written.
    pub updated_rows: Option<u64>,
}

/// Result of an append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Row was written remotely.
    Appended(AppendConfirmation),
    /// No write credentials; the row was only prepared locally.
    Prepared(SheetRow),
}

impl AppendOutcome {
    /// Whether a remote write happened.
    pub fn is_remote(&self) -> bool {
        matches!(self, AppendOutcome::Appended(_))
    }
}
