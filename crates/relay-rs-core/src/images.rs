//! Local storage for received photos.

use crate::error::RelayError;
use log::info;
use relay_rs_memory::UserId;
use std::path::{Path, PathBuf};

/// File extensions listed as stored images.
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Directory of downloaded photos.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RelayError> {
        let root = root.into();
        if !root.exists() {
            std::fs::create_dir_all(&root)?;
            info!("created image directory (path={})", root.display());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination for a photo received from `user_id` at `timestamp_ms`.
    pub fn path_for(&self, user_id: UserId, timestamp_ms: i64) -> PathBuf {
        self.root.join(format!("{user_id}_{timestamp_ms}.jpg"))
    }

    /// Stored image file names in lexicographic order.
    pub fn list(&self) -> Result<Vec<String>, RelayError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if is_image_name(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// First stored image, if any.
    pub fn first(&self) -> Result<Option<(String, PathBuf)>, RelayError> {
        Ok(self.list()?.into_iter().next().map(|name| {
            let path = self.root.join(&name);
            (name, path)
        }))
    }
}

/// Whether the name ends in a known image extension, ignoring case.
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
