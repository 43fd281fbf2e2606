//! Directory records and the raw input they are matched against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Rejection of a directory write before it reaches any backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,
    #[error("url is required")]
    EmptyUrl,
    #[error("url is not valid: {0}")]
    InvalidUrl(String),
    #[error("id is required")]
    MissingId,
}

/// A single record of the link directory.
///
/// `id` is `None` until the entry has been persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    /// Alternative spellings matched like `name`. Output always uses `name`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl LinkEntry {
    /// Builds a not yet persisted entry from a validated pair.
    pub fn unsaved(link: NewLink) -> Self {
        Self {
            id: None,
            name: link.name,
            url: link.url,
            aliases: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Returns `true` when both entries carry the same name and url.
    pub fn same_link(&self, other: &LinkEntry) -> bool {
        self.name == other.name && self.url == other.url
    }
}

/// A trimmed, non-empty name with an absolute url.
///
/// Construction goes through [`NewLink::new`], so every value of this type
/// has already passed input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    name: String,
    url: String,
}

impl NewLink {
    /// Validates and trims a user supplied name/url pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either field is empty after trimming, or if the
    /// url does not parse as an absolute url.
    pub fn new(name: &str, url: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if let Err(error) = Url::parse(url) {
            return Err(ValidationError::InvalidUrl(format!("{url} ({error})")));
        }

        Ok(Self {
            name: name.to_owned(),
            url: url.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TryFrom<&LinkEntry> for NewLink {
    type Error = ValidationError;

    fn try_from(entry: &LinkEntry) -> Result<Self, Self::Error> {
        NewLink::new(&entry.name, &entry.url)
    }
}

/// Splits a pasted block into mention lines: trimmed, blank lines dropped,
/// original order and duplicates kept.
pub fn parse_mentions(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
