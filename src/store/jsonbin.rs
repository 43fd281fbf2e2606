//! Remote key/value backend: the directory as the record of a JSONBin bin.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use url::Url;

use super::StoreError;
use super::document::{DocumentBackend, DocumentStore};
use crate::constants::JSONBIN_ENDPOINT;
use crate::link::LinkEntry;

pub type JsonBinStore = DocumentStore<JsonBin>;

const MASTER_KEY_HEADER: &str = "X-Master-Key";
const BIN_META_HEADER: &str = "X-Bin-Meta";

/// A single bin holding the directory as a JSON array.
pub struct JsonBin {
    client: Client,
    record_url: Url,
    latest_url: Url,
    master_key: String,
}

impl JsonBin {
    /// # Errors
    ///
    /// Returns an error if the bin id does not form a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(bin_id: &str, master_key: String) -> Result<Self, StoreError> {
        Self::with_endpoint(JSONBIN_ENDPOINT, bin_id, master_key)
    }

    /// Same as [`JsonBin::new`] against another JSONBin compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint or bin id do not form a valid URL or
    /// the HTTP client cannot be built.
    pub fn with_endpoint(
        endpoint: &str,
        bin_id: &str,
        master_key: String,
    ) -> Result<Self, StoreError> {
        let invalid = |error: url::ParseError| StoreError::Transport(format!("invalid bin url: {error}"));
        let base = Url::parse(endpoint).map_err(invalid)?;
        let record_url = base.join(bin_id.trim()).map_err(invalid)?;
        let latest_url = base
            .join(&format!("{}/latest", bin_id.trim()))
            .map_err(invalid)?;
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            record_url,
            latest_url,
            master_key,
        })
    }
}

impl JsonBinStore {
    /// # Errors
    ///
    /// See [`JsonBin::new`].
    pub fn connect(bin_id: &str, master_key: String) -> Result<Self, StoreError> {
        Ok(DocumentStore::new(JsonBin::new(bin_id, master_key)?))
    }
}

#[async_trait]
impl DocumentBackend for JsonBin {
    async fn load(&self) -> Result<Vec<LinkEntry>, StoreError> {
        let entries: Vec<LinkEntry> = self
            .client
            .get(self.latest_url.clone())
            .header(MASTER_KEY_HEADER, &self.master_key)
            .header(BIN_META_HEADER, "false")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("Fetched {} links from {}", entries.len(), self.record_url);

        Ok(entries)
    }

    async fn save(&self, entries: &[LinkEntry]) -> Result<(), StoreError> {
        self.client
            .put(self.record_url.clone())
            .header(MASTER_KEY_HEADER, &self.master_key)
            .json(entries)
            .send()
            .await?
            .error_for_status()?;
        debug!("Saved {} links to {}", entries.len(), self.record_url);

        Ok(())
    }
}
