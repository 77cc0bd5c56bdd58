//! DynamoDB key-value backend.
//!
//! Each of the three tables needs a single string partition key named `ID`
//! and nothing else. `ExpiredAt` is written as a plain string attribute;
//! it is not a DynamoDB TTL attribute.
//!
//! # Example
//!
//! ```no_run
//! use oauth2_kv_store::config::StoreConfig;
//! use oauth2_kv_store::stores::DynamoDbKeyValueStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // DynamoDB Local
//! let config = StoreConfig::default()
//!     .with_region("us-east-1")
//!     .with_endpoint("http://localhost:8000")
//!     .with_credentials("local", "local");
//!
//! let backend = DynamoDbKeyValueStore::from_config(&config).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::providers::{AttributeValue, Item, Key, KeyValueStore, ReadConsistency};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue as DynamoValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

/// Region used when neither the configuration nor the environment names one.
const FALLBACK_REGION: &str = "us-east-1";

/// Provider name reported for static credentials.
const CREDENTIALS_PROVIDER: &str = "oauth2-kv-store-static";

/// DynamoDB-backed key-value store.
///
/// This type is `Clone`; clones share the SDK client and its connection pool.
#[derive(Debug, Clone)]
pub struct DynamoDbKeyValueStore {
    client: Client,
}

impl DynamoDbKeyValueStore {
    /// Build a client from the store configuration.
    ///
    /// - `region` falls back to the SDK's default chain, then `us-east-1`.
    /// - `endpoint` overrides the service endpoint (DynamoDB Local, LocalStack).
    /// - `credentials` replaces the SDK's credential chain when set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the configuration fails
    /// validation.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let region = RegionProviderChain::first_try(config.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(FALLBACK_REGION);

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        if let Some(credentials) = &config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                &credentials.access_key_id,
                &credentials.secret_access_key,
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        let sdk_config = loader.load().await;

        tracing::info!(
            region = ?sdk_config.region(),
            endpoint = ?config.endpoint,
            static_credentials = config.credentials.is_some(),
            "DynamoDbKeyValueStore initialized"
        );

        Ok(Self::from_client(Client::new(&sdk_config)))
    }

    /// Wrap an existing SDK client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl KeyValueStore for DynamoDbKeyValueStore {
    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        let item: HashMap<String, DynamoValue> = item
            .into_iter()
            .map(|(name, value)| (name, to_dynamo(value)))
            .collect();

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| StoreError::backend("put_item", table, DisplayErrorContext(&e)))?;

        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        consistency: ReadConsistency,
    ) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(&key.attribute, DynamoValue::S(key.value.clone()))
            .consistent_read(consistency.is_strong())
            .send()
            .await
            .map_err(|e| StoreError::backend("get_item", table, DisplayErrorContext(&e)))?;

        match output.item() {
            Some(item) if !item.is_empty() => item
                .iter()
                .map(|(name, value)| Ok((name.clone(), from_dynamo(table, name, value)?)))
                .collect::<Result<Item>>()
                .map(Some),
            _ => Ok(None),
        }
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table)
            .key(&key.attribute, DynamoValue::S(key.value.clone()))
            .send()
            .await
            .map_err(|e| StoreError::backend("delete_item", table, DisplayErrorContext(&e)))?;

        Ok(())
    }
}

fn to_dynamo(value: AttributeValue) -> DynamoValue {
    match value {
        AttributeValue::S(s) => DynamoValue::S(s),
        AttributeValue::B(b) => DynamoValue::B(Blob::new(b)),
    }
}

fn from_dynamo(table: &str, name: &str, value: &DynamoValue) -> Result<AttributeValue> {
    match value {
        DynamoValue::S(s) => Ok(AttributeValue::S(s.clone())),
        DynamoValue::B(b) => Ok(AttributeValue::B(b.as_ref().to_vec())),
        other => Err(StoreError::malformed(
            table,
            format!("{name} has unsupported attribute type {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_conversion_roundtrip() {
        let s = to_dynamo(AttributeValue::S("A1".to_string()));
        let b = to_dynamo(AttributeValue::B(vec![7, 8, 9]));

        assert_eq!(
            from_dynamo("access", "ID", &s).unwrap(),
            AttributeValue::S("A1".to_string())
        );
        assert_eq!(
            from_dynamo("basic", "Data", &b).unwrap(),
            AttributeValue::B(vec![7, 8, 9])
        );
    }

    #[test]
    fn test_unsupported_attribute_is_malformed() {
        let n = DynamoValue::N("42".to_string());

        assert!(matches!(
            from_dynamo("basic", "ExpiredAt", &n),
            Err(StoreError::MalformedRecord { .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires DynamoDB Local on :8000 with the default tables
    #[allow(clippy::unwrap_used, clippy::expect_used)]
    async fn test_dynamodb_item_lifecycle() {
        let config = StoreConfig::default()
            .with_region("us-east-1")
            .with_endpoint("http://localhost:8000")
            .with_credentials("local", "local");
        let store = DynamoDbKeyValueStore::from_config(&config)
            .await
            .expect("Failed to create store");
        let id = uuid::Uuid::new_v4().simple().to_string();
        let key = Key::new("ID", id.clone());
        let item = Item::from([
            ("ID".to_string(), AttributeValue::S(id)),
            ("Data".to_string(), AttributeValue::B(vec![1, 2, 3])),
        ]);

        store.put_item("oauth2_basic", item.clone()).await.expect("put");

        let found = store
            .get_item("oauth2_basic", &key, ReadConsistency::Strong)
            .await
            .expect("get");
        assert_eq!(found, Some(item));

        store.delete_item("oauth2_basic", &key).await.expect("delete");
        let after = store
            .get_item("oauth2_basic", &key, ReadConsistency::Strong)
            .await
            .expect("get after delete");
        assert!(after.is_none());
    }
}
