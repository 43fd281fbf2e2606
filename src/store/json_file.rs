//! Static document backend: the directory as a JSON array in a local file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;

use super::StoreError;
use super::document::{DocumentBackend, DocumentStore};
use crate::link::LinkEntry;

pub type JsonFileStore = DocumentStore<JsonFile>;

/// A JSON array of links on disk. A missing file reads as an empty directory.
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        DocumentStore::new(JsonFile::new(path))
    }
}

#[async_trait]
impl DocumentBackend for JsonFile {
    async fn load(&self) -> Result<Vec<LinkEntry>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(error) => return Err(error.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, entries: &[LinkEntry]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        // Readers only ever see a complete document.
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!("Saved {} links to {}", entries.len(), self.path.display());

        Ok(())
    }
}
