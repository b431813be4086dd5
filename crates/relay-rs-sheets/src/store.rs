//! Store abstraction over the remote message log.

use crate::error::SheetsError;
use crate::model::{AppendOutcome, SheetRow};
use async_trait::async_trait;

#[async_trait]
/// Append-only log with an independent read view.
pub trait SheetStore: Send + Sync {
    /// Append one row. Missing write credentials degrade to a local prepare.
    async fn append(&self, row: SheetRow) -> Result<AppendOutcome, SheetsError>;

    /// Read all rows of the configured range.
    async fn read(&self) -> Result<Vec<Vec<String>>, SheetsError>;
}
