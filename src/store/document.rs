//! Stores that keep the whole directory as one document.
//!
//! Every write is a read-modify-write of the full document. Writes through
//! the same [`DocumentStore`] are serialized so concurrent creates in a
//! commit batch cannot overwrite each other.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{DirectoryStore, StoreError, require_id};
use crate::link::{LinkEntry, NewLink};

/// Loads and saves a complete directory document.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn load(&self) -> Result<Vec<LinkEntry>, StoreError>;

    async fn save(&self, entries: &[LinkEntry]) -> Result<(), StoreError>;
}

/// [`DirectoryStore`] over any [`DocumentBackend`].
pub struct DocumentStore<B> {
    backend: B,
    write_lock: Mutex<()>,
}

impl<B: DocumentBackend> DocumentStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the document, assigning ids to entries written before ids
    /// existed. Such entries are saved back straight away, even on a plain
    /// listing, so their ids stay stable across loads. Must be called with
    /// `write_lock` held.
    async fn load_with_ids(&self) -> Result<Vec<LinkEntry>, StoreError> {
        let mut entries = self.backend.load().await?;
        let mut assigned = 0;
        for entry in entries.iter_mut().filter(|entry| entry.id.is_none()) {
            entry.id = Some(new_id());
            assigned += 1;
        }
        if assigned > 0 {
            warn!("Assigned ids to {assigned} legacy directory entries, saving the document");
            self.backend.save(&entries).await?;
        }

        Ok(entries)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn stored(link: NewLink) -> LinkEntry {
    LinkEntry {
        id: Some(new_id()),
        created_at: Utc::now(),
        ..LinkEntry::unsaved(link)
    }
}

/// Turns a failed document write into a per-item failure.
fn batch_failure(error: &StoreError) -> StoreError {
    StoreError::Transport(format!("batch write failed: {error}"))
}

#[async_trait]
impl<B: DocumentBackend> DirectoryStore for DocumentStore<B> {
    async fn list(&self) -> Result<Vec<LinkEntry>, StoreError> {
        let _guard = self.write_lock.lock().await;
        self.load_with_ids().await
    }

    async fn create(&self, link: NewLink) -> Result<LinkEntry, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_with_ids().await?;
        let entry = stored(link);
        entries.push(entry.clone());
        self.backend.save(&entries).await?;
        debug!("Created link {:?} for {}", entry.id, entry.name);

        Ok(entry)
    }

    async fn update(&self, id: &str, link: NewLink) -> Result<LinkEntry, StoreError> {
        let id = require_id(id)?;
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_with_ids().await?;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        entry.name = link.name().to_owned();
        entry.url = link.url().to_owned();
        let updated = entry.clone();
        self.backend.save(&entries).await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = require_id(id)?;
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_with_ids().await?;
        let before = entries.len();
        entries.retain(|entry| entry.id.as_deref() != Some(id));
        if entries.len() == before {
            return Err(StoreError::NotFound(id.to_owned()));
        }

        self.backend.save(&entries).await
    }

    async fn create_many(&self, links: Vec<NewLink>) -> Vec<Result<LinkEntry, StoreError>> {
        let _guard = self.write_lock.lock().await;
        let mut entries = match self.load_with_ids().await {
            Ok(entries) => entries,
            Err(error) => return links.iter().map(|_| Err(batch_failure(&error))).collect(),
        };

        let created: Vec<LinkEntry> = links.into_iter().map(stored).collect();
        entries.extend(created.iter().cloned());

        match self.backend.save(&entries).await {
            Ok(()) => created.into_iter().map(Ok).collect(),
            Err(error) => created.iter().map(|_| Err(batch_failure(&error))).collect(),
        }
    }

    async fn update_many(
        &self,
        links: Vec<(String, NewLink)>,
    ) -> Vec<Result<LinkEntry, StoreError>> {
        let _guard = self.write_lock.lock().await;
        let mut entries = match self.load_with_ids().await {
            Ok(entries) => entries,
            Err(error) => return links.iter().map(|_| Err(batch_failure(&error))).collect(),
        };

        let mut results: Vec<Result<LinkEntry, StoreError>> = links
            .into_iter()
            .map(|(id, link)| -> Result<LinkEntry, StoreError> {
                let entry = entries
                    .iter_mut()
                    .find(|entry| entry.id.as_deref() == Some(id.as_str()))
                    .ok_or(StoreError::NotFound(id))?;
                entry.name = link.name().to_owned();
                entry.url = link.url().to_owned();
                Ok(entry.clone())
            })
            .collect();

        if results.iter().any(Result::is_ok)
            && let Err(error) = self.backend.save(&entries).await
        {
            for result in results.iter_mut().filter(|result| result.is_ok()) {
                *result = Err(batch_failure(&error));
            }
        }

        results
    }
}
