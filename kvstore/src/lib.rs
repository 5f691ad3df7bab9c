//! Minimal SQLite-backed key-value store holding JSON-encoded values.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const TABLENAME: &str = "kvstore";
const KEY_FIELD: &str = "key";
const VALUE_FIELD: &str = "value";

#[derive(Error, Debug)]
pub enum KVStoreError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),
    #[error("could not (de)serialize value for key '{key}': {source}")]
    Serde {
        key: String,
        source: serde_json::Error,
    },
}

pub struct KVDb(Connection);

impl KVDb {
    /// Open (creating if needed) the store at `path`. `:memory:` gives a private in-memory store.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        log::debug!("Opening key-value store at {}", path.display());
        let connection = Connection::open(path)?;
        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS '{TABLENAME}' (
                {KEY_FIELD} TEXT PRIMARY KEY NOT NULL,
                {VALUE_FIELD} BLOB NOT NULL
                )"
            ),
            [],
        )?;
        Ok(KVDb(connection))
    }

    fn select(&self, key: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.0
            .query_row(
                &format!("SELECT {VALUE_FIELD} FROM '{TABLENAME}' WHERE {KEY_FIELD} = ?1"),
                [key],
                |r| r.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Result<Option<T>, KVStoreError> {
        let key = key.as_ref();
        self.select(key)?
            .map(|v| serde_json::from_slice::<T>(&v))
            .transpose()
            .map_err(|source| KVStoreError::Serde {
                key: key.to_string(),
                source,
            })
    }

    pub fn set<K: AsRef<str>, V: Serialize>(&self, key: K, value: V) -> Result<(), KVStoreError> {
        let key = key.as_ref();
        let value = serde_json::to_string(&value).map_err(|source| KVStoreError::Serde {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, &value)
    }

    /// Store an already-serialized JSON value.
    pub fn set_raw(&self, key: &str, value_json: &str) -> Result<(), KVStoreError> {
        let mut stmt = self.0.prepare_cached(&format!(
            "INSERT INTO '{TABLENAME}' ({KEY_FIELD}, {VALUE_FIELD}) values (?1, ?2)
            ON CONFLICT({KEY_FIELD}) DO UPDATE SET {VALUE_FIELD}=?2",
        ))?;
        stmt.execute(params![key, value_json.as_bytes()])?;
        log::trace!("Upserted key '{key}'");
        Ok(())
    }

    /// All keys starting with `prefix`, in ascending order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KVStoreError> {
        let mut stmt = self.0.prepare(&format!(
            "SELECT {KEY_FIELD} FROM '{TABLENAME}' WHERE substr({KEY_FIELD}, 1, ?2) = ?1 ORDER BY {KEY_FIELD}"
        ))?;
        let rows = stmt.query_map(params![prefix, prefix.chars().count() as i64], |r| {
            r.get::<_, String>(0)
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
