//! Relational backend: one row per link in a SQLite `links` table.

use std::convert::TryFrom;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

use super::{DirectoryStore, StoreError, require_id};
use crate::link::{LinkEntry, NewLink};

/// Directory kept in a SQLite database.
pub struct SqliteStore {
    /// The underlying SQLite connection wrapped in Arc<Mutex<>> to make it thread-safe
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `database_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(database_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(database_path)?;
        Self::init_schema(&conn)?;
        debug!("Opened link directory at {database_path}");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                aliases TEXT NOT NULL DEFAULT '[]'
            )",
            params![],
        )?;

        let has_aliases: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('links') WHERE name = 'aliases'",
            [],
            |row| row.get(0),
        )?;
        if !has_aliases {
            debug!("Adding aliases column to links table");
            conn.execute(
                "ALTER TABLE links ADD COLUMN aliases TEXT NOT NULL DEFAULT '[]'",
                params![],
            )?;
        }

        Ok(())
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<LinkEntry>, StoreError> {
        let row: Option<LinkRow> = conn
            .query_row(
                "SELECT id, name, url, created_at, aliases FROM links WHERE id = ?1",
                [id],
                LinkRow::from_row,
            )
            .optional()?;

        row.map(LinkEntry::try_from).transpose()
    }
}

/// Parses a store id, treating anything non-numeric as unknown.
fn row_id(id: &str) -> Result<i64, StoreError> {
    let id = require_id(id)?;
    id.parse()
        .map_err(|_| StoreError::NotFound(id.to_owned()))
}

#[async_trait]
impl DirectoryStore for SqliteStore {
    async fn list(&self) -> Result<Vec<LinkEntry>, StoreError> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, url, created_at, aliases FROM links ORDER BY created_at DESC, id DESC",
        )?;
        let rows: Result<Vec<LinkRow>, rusqlite::Error> =
            stmt.query_map([], LinkRow::from_row)?.collect();

        rows?.into_iter().map(LinkEntry::try_from).collect()
    }

    async fn create(&self, link: NewLink) -> Result<LinkEntry, StoreError> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO links (name, url, created_at) VALUES (?1, ?2, ?3)",
            params![link.name(), link.url(), created_at.timestamp()],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Created link {id} for {}", link.name());

        Self::fetch(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, link: NewLink) -> Result<LinkEntry, StoreError> {
        let row_id = row_id(id)?;
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let changed = conn.execute(
            "UPDATE links SET name = ?1, url = ?2 WHERE id = ?3",
            params![link.name(), link.url(), row_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_owned()));
        }

        Self::fetch(&conn, row_id)?.ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let row_id = row_id(id)?;
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let removed = conn.execute("DELETE FROM links WHERE id = ?1", params![row_id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id.to_owned()));
        }

        Ok(())
    }
}

/// Represents a link stored in the database
#[derive(Debug)]
struct LinkRow {
    id: i64,
    name: String,
    url: String,
    created_at: i64,
    /// JSON array of strings.
    aliases: String,
}

impl LinkRow {
    fn from_row(row: &rusqlite::Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(LinkRow {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            created_at: row.get(3)?,
            aliases: row.get(4)?,
        })
    }
}

impl TryFrom<LinkRow> for LinkEntry {
    type Error = StoreError;

    fn try_from(row: LinkRow) -> Result<Self, StoreError> {
        let created_at: DateTime<Utc> = DateTime::from_timestamp_secs(row.created_at)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, row.created_at))?;

        Ok(LinkEntry {
            id: Some(row.id.to_string()),
            name: row.name,
            url: row.url,
            aliases: serde_json::from_str(&row.aliases)?,
            created_at,
        })
    }
}
