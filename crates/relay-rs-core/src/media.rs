//! Media download seam implemented by the transport.

use crate::error::RelayError;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
/// Downloads transport-hosted files to local disk.
pub trait MediaFetcher: Send + Sync {
    /// Download the file identified by `file_id` into `destination`.
    async fn download(&self, file_id: &str, destination: &Path) -> Result<(), RelayError>;
}
