//! Fault-injecting key-value backend.
//!
//! Wraps another backend, records every call and fails or delays the calls
//! a test asks for. Used to exercise partial create chains, transport
//! errors on lookups and revocation, and operation deadlines.

#![allow(clippy::unwrap_used)] // Test infrastructure: mutex poisoning is a test failure
#![allow(clippy::missing_panics_doc)]

use oauth2_kv_store::StoreError;
use oauth2_kv_store::providers::{Item, Key, KeyValueStore, ReadConsistency};
use oauth2_kv_store::records::ID_ATTRIBUTE;
use oauth2_kv_store::stores::InMemoryKeyValueStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A backend call as observed by [`FaultyKeyValueStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `put_item` on a table, with the item's `ID`.
    Put {
        /// Table written to
        table: String,
        /// `ID` attribute of the item
        id: String,
    },
    /// `get_item` on a table.
    Get {
        /// Table read from
        table: String,
        /// Requested key value
        id: String,
        /// Requested consistency
        consistency: ReadConsistency,
    },
    /// `delete_item` on a table.
    Delete {
        /// Table deleted from
        table: String,
        /// Requested key value
        id: String,
    },
}

#[derive(Debug, Default)]
struct Faults {
    calls: Vec<BackendCall>,
    puts_seen: usize,
    fail_put_numbers: HashSet<usize>,
    fail_get_tables: HashSet<String>,
    fail_delete_tables: HashSet<String>,
    delay: Option<Duration>,
}

/// Backend wrapper that records calls and injects failures.
///
/// # Example
///
/// ```
/// use oauth2_kv_store_testing::FaultyKeyValueStore;
///
/// // Second write of any create chain fails
/// let backend = FaultyKeyValueStore::new().fail_put_number(2);
/// ```
#[derive(Debug, Clone)]
pub struct FaultyKeyValueStore<S = InMemoryKeyValueStore> {
    inner: S,
    faults: Arc<Mutex<Faults>>,
}

impl FaultyKeyValueStore {
    /// Wrap a fresh in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::wrap(InMemoryKeyValueStore::new())
    }
}

impl Default for FaultyKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FaultyKeyValueStore<S> {
    /// Wrap an existing backend.
    #[must_use]
    pub fn wrap(inner: S) -> Self {
        Self {
            inner,
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    /// The wrapped backend.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Fail the n-th `put_item` call (1-based), counted across all tables.
    #[must_use]
    pub fn fail_put_number(self, n: usize) -> Self {
        self.faults.lock().unwrap().fail_put_numbers.insert(n);
        self
    }

    /// Fail every `get_item` on a table.
    #[must_use]
    pub fn fail_gets_on(self, table: &str) -> Self {
        self.faults
            .lock()
            .unwrap()
            .fail_get_tables
            .insert(table.to_string());
        self
    }

    /// Fail every `delete_item` on a table.
    #[must_use]
    pub fn fail_deletes_on(self, table: &str) -> Self {
        self.faults
            .lock()
            .unwrap()
            .fail_delete_tables
            .insert(table.to_string());
        self
    }

    /// Delay every call before forwarding it.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        self.faults.lock().unwrap().delay = Some(delay);
        self
    }

    /// Every call seen so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.faults.lock().unwrap().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.faults.lock().unwrap().calls.clear();
    }

    fn delay(&self) -> Option<Duration> {
        self.faults.lock().unwrap().delay
    }
}

fn injected(operation: &'static str, table: &str) -> StoreError {
    StoreError::backend(operation, table, "injected failure")
}

impl<S: KeyValueStore> KeyValueStore for FaultyKeyValueStore<S> {
    async fn put_item(&self, table: &str, item: Item) -> oauth2_kv_store::Result<()> {
        let fail = {
            let mut faults = self.faults.lock().unwrap();
            faults.puts_seen += 1;
            let id = item
                .get(ID_ATTRIBUTE)
                .and_then(|value| value.as_s())
                .unwrap_or_default()
                .to_string();
            faults.calls.push(BackendCall::Put {
                table: table.to_string(),
                id,
            });
            let seen = faults.puts_seen;
            faults.fail_put_numbers.contains(&seen)
        };

        if let Some(delay) = self.delay() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(injected("put_item", table));
        }
        self.inner.put_item(table, item).await
    }

    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        consistency: ReadConsistency,
    ) -> oauth2_kv_store::Result<Option<Item>> {
        let fail = {
            let mut faults = self.faults.lock().unwrap();
            faults.calls.push(BackendCall::Get {
                table: table.to_string(),
                id: key.value.clone(),
                consistency,
            });
            faults.fail_get_tables.contains(table)
        };

        if let Some(delay) = self.delay() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(injected("get_item", table));
        }
        self.inner.get_item(table, key, consistency).await
    }

    async fn delete_item(&self, table: &str, key: &Key) -> oauth2_kv_store::Result<()> {
        let fail = {
            let mut faults = self.faults.lock().unwrap();
            faults.calls.push(BackendCall::Delete {
                table: table.to_string(),
                id: key.value.clone(),
            });
            faults.fail_delete_tables.contains(table)
        };

        if let Some(delay) = self.delay() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(injected("delete_item", table));
        }
        self.inner.delete_item(table, key).await
    }
}
