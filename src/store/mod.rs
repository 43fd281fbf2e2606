//! The link directory store contract and its backends.
//!
//! The resolver only depends on [`DirectoryStore`]. Each backend gets a
//! single adapter behind it:
//! * [`SqliteStore`] keeps one row per link in a relational table
//! * [`JsonFileStore`] keeps the whole directory as a static JSON document
//! * [`JsonBinStore`] keeps the whole directory in a remote key/value bin

mod document;
mod json_file;
mod jsonbin;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;

use crate::link::{LinkEntry, NewLink, ValidationError};

pub use document::{DocumentBackend, DocumentStore};
pub use json_file::{JsonFile, JsonFileStore};
pub use jsonbin::{JsonBin, JsonBinStore};
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid link: {0}")]
    Validation(#[from] ValidationError),
    #[error("link {0} not found")]
    NotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("database failure: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("malformed directory document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        StoreError::Transport(error.to_string())
    }
}

/// Asynchronous name -> url directory.
///
/// Batch variants report one result per input item, in input order. The
/// default implementations issue the single-item calls concurrently.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<LinkEntry>, StoreError>;

    async fn create(&self, link: NewLink) -> Result<LinkEntry, StoreError>;

    async fn update(&self, id: &str, link: NewLink) -> Result<LinkEntry, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn create_many(&self, links: Vec<NewLink>) -> Vec<Result<LinkEntry, StoreError>> {
        join_all(links.into_iter().map(|link| self.create(link))).await
    }

    async fn update_many(
        &self,
        links: Vec<(String, NewLink)>,
    ) -> Vec<Result<LinkEntry, StoreError>> {
        join_all(
            links
                .into_iter()
                .map(|(id, link)| async move { self.update(&id, link).await }),
        )
        .await
    }
}

#[async_trait]
impl<T: DirectoryStore + ?Sized> DirectoryStore for Arc<T> {
    async fn list(&self) -> Result<Vec<LinkEntry>, StoreError> {
        (**self).list().await
    }

    async fn create(&self, link: NewLink) -> Result<LinkEntry, StoreError> {
        (**self).create(link).await
    }

    async fn update(&self, id: &str, link: NewLink) -> Result<LinkEntry, StoreError> {
        (**self).update(id, link).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn create_many(&self, links: Vec<NewLink>) -> Vec<Result<LinkEntry, StoreError>> {
        (**self).create_many(links).await
    }

    async fn update_many(
        &self,
        links: Vec<(String, NewLink)>,
    ) -> Vec<Result<LinkEntry, StoreError>> {
        (**self).update_many(links).await
    }
}

/// Rejects an empty id before any backend call.
pub(crate) fn require_id(id: &str) -> Result<&str, StoreError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingId.into());
    }
    Ok(id)
}
