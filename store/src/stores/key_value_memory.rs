//! In-memory key-value backend.
//!
//! Tables live in a shared `HashMap` behind a mutex. Clones share the same
//! data, so a test can hand one clone to the token store and inspect the
//! other. Nothing is persisted.

use crate::error::{Result, StoreError};
use crate::providers::{Item, Key, KeyValueStore, ReadConsistency};
use crate::records::ID_ATTRIBUTE;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Tables = HashMap<String, HashMap<String, Item>>;

/// In-memory key-value store.
///
/// Every read is strongly consistent.
#[derive(Debug, Clone)]
pub struct InMemoryKeyValueStore {
    tables: Arc<Mutex<Tables>>,
    key_attribute: String,
}

impl InMemoryKeyValueStore {
    /// Create an empty store keyed on the `ID` attribute.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_attribute(ID_ATTRIBUTE)
    }

    /// Create an empty store keyed on a custom attribute.
    #[must_use]
    pub fn with_key_attribute(key_attribute: impl Into<String>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
            key_attribute: key_attribute.into(),
        }
    }

    /// Number of items in a table.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn len(&self, table: &str) -> Result<usize> {
        Ok(self
            .lock("len", table)?
            .get(table)
            .map_or(0, HashMap::len))
    }

    /// Returns `true` if a table holds no items.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn is_empty(&self, table: &str) -> Result<bool> {
        Ok(self.len(table)? == 0)
    }

    /// Ids of all items in a table, sorted.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn ids(&self, table: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .lock("ids", table)?
            .get(table)
            .map(|items| items.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    fn lock(&self, operation: &'static str, table: &str) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::backend(operation, table, "in-memory store lock poisoned"))
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        let id = item
            .get(&self.key_attribute)
            .and_then(|value| value.as_s())
            .ok_or_else(|| {
                StoreError::malformed(table, format!("item has no string {}", self.key_attribute))
            })?
            .to_string();

        self.lock("put_item", table)?
            .entry(table.to_string())
            .or_default()
            .insert(id, item);
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        _consistency: ReadConsistency,
    ) -> Result<Option<Item>> {
        let id = key.value_on(table, &self.key_attribute)?;

        Ok(self
            .lock("get_item", table)?
            .get(table)
            .and_then(|items| items.get(id))
            .cloned())
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<()> {
        let id = key.value_on(table, &self.key_attribute)?;

        if let Some(items) = self.lock("delete_item", table)?.get_mut(table) {
            items.remove(id);
        }
        Ok(())
    }
}
