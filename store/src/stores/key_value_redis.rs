//! Redis-based key-value backend.
//!
//! # Architecture
//!
//! Items are stored in Redis with:
//! - **Primary key**: `{table}:{id}` → bincode-serialized item
//! - **No TTL**: `ExpiredAt` is advisory metadata; callers revoke explicitly
//!
//! A single Redis node always reads its own writes, so the requested
//! [`ReadConsistency`] is ignored.
//!
//! # Example
//!
//! ```no_run
//! use oauth2_kv_store::stores::RedisKeyValueStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RedisKeyValueStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, StoreError};
use crate::providers::{Item, Key, KeyValueStore, ReadConsistency};
use crate::records::ID_ATTRIBUTE;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// `Redis`-backed key-value store.
///
/// This type is `Clone`; clones share the same `ConnectionManager`.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
    /// Attribute holding each item's key.
    key_attribute: String,
}

impl RedisKeyValueStore {
    /// Connect to `Redis`.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - `Redis` connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is malformed or the
    /// server cannot be reached.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisKeyValueStore initialized successfully");

        Ok(Self {
            conn_manager,
            key_attribute: ID_ATTRIBUTE.to_string(),
        })
    }

    /// Key items on a custom attribute instead of `ID`.
    #[must_use]
    pub fn with_key_attribute(mut self, key_attribute: impl Into<String>) -> Self {
        self.key_attribute = key_attribute.into();
        self
    }

    /// Get the `Redis` key for an item.
    fn item_key(table: &str, id: &str) -> String {
        format!("{table}:{id}")
    }
}

impl KeyValueStore for RedisKeyValueStore {
    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let id = item
            .get(&self.key_attribute)
            .and_then(|value| value.as_s())
            .ok_or_else(|| {
                StoreError::malformed(table, format!("item has no string {}", self.key_attribute))
            })?;
        let redis_key = Self::item_key(table, id);

        let bytes =
            bincode::serialize(&item).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let _: () = conn
            .set(&redis_key, bytes)
            .await
            .map_err(|e| StoreError::backend("put_item", table, e))?;

        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        _consistency: ReadConsistency,
    ) -> Result<Option<Item>> {
        let mut conn = self.conn_manager.clone();
        let id = key.value_on(table, &self.key_attribute)?;
        let redis_key = Self::item_key(table, id);

        let bytes: Option<Vec<u8>> = conn
            .get(&redis_key)
            .await
            .map_err(|e| StoreError::backend("get_item", table, e))?;

        bytes
            .map(|bytes| {
                bincode::deserialize(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .transpose()
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let id = key.value_on(table, &self.key_attribute)?;
        let redis_key = Self::item_key(table, id);

        let _: () = conn
            .del(&redis_key)
            .await
            .map_err(|e| StoreError::backend("delete_item", table, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::AttributeValue;

    #[test]
    fn test_item_key_is_table_scoped() {
        assert_eq!(RedisKeyValueStore::item_key("oauth2_access", "A1"), "oauth2_access:A1");
    }

    #[test]
    fn test_item_bincode_roundtrip() {
        let item = Item::from([
            ("ID".to_string(), AttributeValue::S("C1".to_string())),
            ("Data".to_string(), AttributeValue::B(b"{\"code\":\"C1\"}".to_vec())),
        ]);

        let bytes = bincode::serialize(&item).unwrap();
        let decoded: Item = bincode::deserialize(&bytes).unwrap();

        assert_eq!(decoded, item);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used, clippy::expect_used)]
    async fn test_redis_item_lifecycle() {
        let store = RedisKeyValueStore::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to create store");
        let table = format!("test_{}", uuid::Uuid::new_v4().simple());
        let key = Key::new("ID", "k1");
        let item = Item::from([
            ("ID".to_string(), AttributeValue::S("k1".to_string())),
            ("Data".to_string(), AttributeValue::B(vec![1, 2, 3])),
        ]);

        store.put_item(&table, item.clone()).await.expect("put");

        let found = store
            .get_item(&table, &key, ReadConsistency::Strong)
            .await
            .expect("get");
        assert_eq!(found, Some(item));

        store.delete_item(&table, &key).await.expect("delete");
        store.delete_item(&table, &key).await.expect("second delete");

        let after = store
            .get_item(&table, &key, ReadConsistency::Eventual)
            .await
            .expect("get after delete");
        assert!(after.is_none());
    }
}
