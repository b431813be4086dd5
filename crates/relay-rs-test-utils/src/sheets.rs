use async_trait::async_trait;
use parking_lot::Mutex;
use relay_rs_sheets::{AppendConfirmation, AppendOutcome, SheetRow, SheetStore, SheetsError};

/// How [`StubSheets`] answers appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendMode {
    /// Behave like a store without write credentials.
    Prepared,
    /// Behave like a successful remote write.
    Appended,
    /// Fail every append with the given status.
    Fail(u16),
}

/// In-memory sheet store recording appended rows.
#[derive(Debug)]
pub struct StubSheets {
    mode: AppendMode,
    rows: Mutex<Vec<SheetRow>>,
    read_failure: Option<u16>,
    preset: Option<Vec<Vec<String>>>,
}

impl StubSheets {
    pub fn new(mode: AppendMode) -> Self {
        Self {
            mode,
            rows: Mutex::new(Vec::new()),
            read_failure: None,
            preset: None,
        }
    }

    /// Serve these rows from `read` instead of the appended ones.
    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.preset = Some(rows);
        self
    }

    /// Make every `read` fail with the given status.
    pub fn failing_reads(mut self, status: u16) -> Self {
        self.read_failure = Some(status);
        self
    }

    /// Rows passed to `append`, including failed ones.
    pub fn appended(&self) -> Vec<SheetRow> {
        self.rows.lock().clone()
    }
}

impl Default for StubSheets {
    fn default() -> Self {
        Self::new(AppendMode::Prepared)
    }
}

#[async_trait]
impl SheetStore for StubSheets {
    async fn append(&self, row: SheetRow) -> Result<AppendOutcome, SheetsError> {
        self.rows.lock().push(row.clone());
        match self.mode {
            AppendMode::Prepared => Ok(AppendOutcome::Prepared(row)),
            AppendMode::Appended => Ok(AppendOutcome::Appended(AppendConfirmation {
                updated_range: Some("Sheet1!A1:B1".to_string()),
                updated_rows: Some(1),
            })),
            AppendMode::Fail(status) => Err(SheetsError::Status {
                status,
                body: "stub append failure".to_string(),
            }),
        }
    }

    async fn read(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        if let Some(status) = self.read_failure {
            return Err(SheetsError::Status {
                status,
                body: "stub read failure".to_string(),
            });
        }
        if let Some(rows) = &self.preset {
            return Ok(rows.clone());
        }
        Ok(self
            .rows
            .lock()
            .iter()
            .map(|row| vec![row.user_id.clone(), row.message.clone()])
            .collect())
    }
}
