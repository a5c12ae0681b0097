/// SQLite-backed key-value storage.
///
/// The database lives in the user's data directory:
/// - Linux: ~/.local/share/photo-sweep/photo_sweep.db
/// - macOS: ~/Library/Application Support/photo-sweep/photo_sweep.db
/// - Windows: %APPDATA%\photo-sweep\photo_sweep.db
///
/// Reads and writes run on the blocking thread pool. A connection is
/// opened per call: rusqlite's `Connection` is not `Send`, so it cannot
/// be shared with a blocking task, and the storage traffic here is one
/// small row per pile mutation.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::task;

use crate::error::TriageError;
use crate::storage::Storage;

pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Open (or create) the database at the default data-dir location.
    pub fn new() -> Result<Self, TriageError> {
        Self::open(Self::default_db_path()?)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, TriageError> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TriageError::Persistence(format!("create data dir: {}", e)))?;
        }

        let conn = Connection::open(&db_path)
            .map_err(|e| TriageError::Persistence(format!("open database: {}", e)))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| TriageError::Persistence(format!("init schema: {}", e)))?;

        println!("📁 Storage initialized at: {}", db_path.display());

        Ok(SqliteStorage { db_path })
    }

    /// Where the database is stored by default.
    fn default_db_path() -> Result<PathBuf, TriageError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| {
                TriageError::Persistence("could not determine user data directory".to_string())
            })?;
        path.push("photo-sweep");
        path.push("photo_sweep.db");
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait(?Send)]
impl Storage for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, TriageError> {
        let db_path = self.db_path.clone();
        let key = key.to_string();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| TriageError::Persistence(format!("open database: {}", e)))?;
            let mut stmt = conn
                .prepare("SELECT value FROM kv WHERE key = ?1")
                .map_err(|e| TriageError::Persistence(e.to_string()))?;
            let mut rows = stmt
                .query([&key])
                .map_err(|e| TriageError::Persistence(e.to_string()))?;
            match rows.next() {
                Ok(Some(row)) => row
                    .get::<_, String>(0)
                    .map(Some)
                    .map_err(|e| TriageError::Persistence(e.to_string())),
                Ok(None) => Ok(None),
                Err(e) => Err(TriageError::Persistence(e.to_string())),
            }
        })
        .await
        .map_err(|e| TriageError::Persistence(format!("task join error: {}", e)))?
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), TriageError> {
        let db_path = self.db_path.clone();
        let key = key.to_string();
        let value = value.to_string();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| TriageError::Persistence(format!("open database: {}", e)))?;
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, value],
            )
            .map_err(|e| TriageError::Persistence(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| TriageError::Persistence(format!("task join error: {}", e)))?
    }
}
