//! The linkr library resolves pasted mentions against a personal directory of
//! name -> url links and formats them into an output block, asking for a url
//! whenever a mention has no match.

pub mod chunk;
pub mod commit;
pub mod constants;
pub mod extract;
pub mod interactive;
pub mod link;
pub mod matcher;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod store;
pub mod suggest;
pub mod template;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::store::{DirectoryStore, JsonBinStore, JsonFileStore, SqliteStore};

/// Enum representing the backend holding the link directory.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StoreBackend {
    /// Relational table in a SQLite database file
    Sqlite { path: String },
    /// Static JSON document on disk
    JsonFile { path: String },
    /// Remote JSONBin bin
    JsonBin { bin_id: String },
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (kind, location) = input
            .split_once(':')
            .ok_or_else(|| format!("Invalid store, expected <kind>:<location>: {}", input))?;
        if location.is_empty() {
            return Err(format!("Missing store location: {}", input));
        }

        match kind.to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite {
                path: location.to_owned(),
            }),
            "json" => Ok(StoreBackend::JsonFile {
                path: location.to_owned(),
            }),
            "jsonbin" => Ok(StoreBackend::JsonBin {
                bin_id: location.to_owned(),
            }),
            _ => Err(format!("Invalid store kind: {}", kind)),
        }
    }
}

impl StoreBackend {
    /// Opens the directory store this backend describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened, or if a JSONBin store
    /// is requested without a master key.
    pub fn open(&self, jsonbin_key: Option<String>) -> Result<Arc<dyn DirectoryStore>> {
        Ok(match self {
            StoreBackend::Sqlite { path } => Arc::new(
                SqliteStore::open(path).context(format!("Failed to open database: {path}"))?,
            ),
            StoreBackend::JsonFile { path } => Arc::new(JsonFileStore::open(path)),
            StoreBackend::JsonBin { bin_id } => {
                let key = jsonbin_key.context("A JSONBin master key is required")?;
                Arc::new(JsonBinStore::connect(bin_id, key)?)
            }
        })
    }
}

pub use extract::extract;
pub use interactive::run_match;
pub use link::{LinkEntry, NewLink, parse_mentions};
pub use resolver::{CompletedPass, Continuation, EntryPolicy, PassStep, resolve_pass, resume};
pub use session::{PassState, Session};
pub use template::FormatTemplate;
