/// Asynchronous key-value persistence collaborator
///
/// The delete pile is the only durable state in the core; it is stored
/// as one string value under one key. Backends:
/// - `SqliteStorage` — durable, on-disk (sqlite.rs)
/// - `MemoryStorage` — process-local, for tests and previews (memory.rs)
use async_trait::async_trait;

use crate::error::TriageError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

#[async_trait(?Send)]
pub trait Storage {
    /// Read the value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>, TriageError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), TriageError>;
}
