/// In-memory key-value storage.
///
/// Not durable: contents vanish with the process. Useful for tests and
/// for running the core without a writable data directory.
use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::TriageError;
use crate::storage::Storage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl Storage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, TriageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), TriageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
