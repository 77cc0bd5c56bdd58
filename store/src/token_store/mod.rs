//! Grant persistence over three key-value tables.
//!
//! # Architecture
//!
//! ```text
//! basic   : ID = code | generated id  →  { Data = grant JSON, ExpiredAt }
//! access  : ID = access token         →  { BasicID, ExpiredAt }
//! refresh : ID = refresh token        →  { BasicID, ExpiredAt }
//! ```
//!
//! - **Create** fans one grant out into up to three writes (basic, access,
//!   refresh). Writes are not atomic across tables: a failure leaves the
//!   records written before it in place.
//! - **Lookup** by code reads the basic table directly. Lookup by access or
//!   refresh token reads the index record first, then the basic record it
//!   points at.
//! - **Revoke** deletes exactly one record. Index records are weak pointers:
//!   removing an access token leaves the basic record and the refresh index
//!   untouched, and a dangling pointer simply resolves to `None`.
//!
//! `ExpiredAt` is advisory. Nothing here deletes expired records.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use oauth2_kv_store::{Grant, GrantStore, StoreConfig, TokenStore};
//! use oauth2_kv_store::stores::InMemoryKeyValueStore;
//!
//! # async fn example() -> oauth2_kv_store::Result<()> {
//! let store = TokenStore::new(InMemoryKeyValueStore::new(), StoreConfig::default())?;
//!
//! let grant = Grant::new("client").with_access("A1", Utc::now(), Duration::hours(1));
//! store.create(&grant).await?;
//!
//! assert_eq!(store.get_by_access("A1").await?, Some(grant));
//!
//! store.remove_by_access("A1").await?;
//! assert_eq!(store.get_by_access("A1").await?, None);
//! # Ok(())
//! # }
//! # tokio_test::block_on(example()).unwrap();
//! ```

mod create;
mod lookup;
mod revoke;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::grant::{Grant, TokenKind};
use crate::providers::{GrantStore, IdGenerator, KeyValueStore, ReadConsistency, UuidGenerator};
use std::future::Future;

/// Token store over a key-value backend.
///
/// Holds only the backend handle, the id generator and read-only
/// configuration, so it can be cloned or shared across tasks freely.
#[derive(Debug, Clone)]
pub struct TokenStore<S, G = UuidGenerator> {
    backend: S,
    ids: G,
    config: StoreConfig,
}

impl<S: KeyValueStore> TokenStore<S> {
    /// Create a token store with UUIDv4 basic ids.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the configuration is invalid.
    pub fn new(backend: S, config: StoreConfig) -> Result<Self> {
        Self::with_id_generator(backend, config, UuidGenerator)
    }
}

impl<S: KeyValueStore, G: IdGenerator> TokenStore<S, G> {
    /// Create a token store with a custom basic id generator.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the configuration is invalid.
    pub fn with_id_generator(backend: S, config: StoreConfig, ids: G) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            basic_table = %config.tables.basic,
            access_table = %config.tables.access,
            refresh_table = %config.tables.refresh,
            consistent_reads = config.consistent_reads,
            "TokenStore configured"
        );

        Ok(Self {
            backend,
            ids,
            config,
        })
    }

    /// The key-value backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// The store configuration.
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Table holding records keyed by the given token kind.
    #[must_use]
    pub fn table(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Code => &self.config.tables.basic,
            TokenKind::Access => &self.config.tables.access,
            TokenKind::Refresh => &self.config.tables.refresh,
        }
    }

    const fn consistency(&self) -> ReadConsistency {
        ReadConsistency::from_flag(self.config.consistent_reads)
    }

    /// Run an operation under the configured deadline, if any.
    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.config.operation_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| {
                tracing::warn!(operation, ?timeout, "Token store operation timed out");
                StoreError::Timeout { operation, timeout }
            })?,
            None => fut.await,
        }
    }
}

impl<S: KeyValueStore, G: IdGenerator> GrantStore for TokenStore<S, G> {
    async fn create(&self, grant: &Grant) -> Result<()> {
        let result = self.with_deadline("create", self.create_records(grant)).await;

        if let Err(error) = &result {
            tracing::error!(
                error = %error,
                client_id = %grant.client_id,
                has_code = grant.has_code(),
                has_access = grant.has_access(),
                has_refresh = grant.has_refresh(),
                "Failed to persist grant"
            );
        }

        result
    }

    async fn remove_by_code(&self, code: &str) -> Result<()> {
        self.with_deadline("remove_by_code", self.revoke(TokenKind::Code, code))
            .await
    }

    async fn remove_by_access(&self, access: &str) -> Result<()> {
        self.with_deadline("remove_by_access", self.revoke(TokenKind::Access, access))
            .await
    }

    async fn remove_by_refresh(&self, refresh: &str) -> Result<()> {
        self.with_deadline("remove_by_refresh", self.revoke(TokenKind::Refresh, refresh))
            .await
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Grant>> {
        self.with_deadline("get_by_code", self.lookup(TokenKind::Code, code))
            .await
    }

    async fn get_by_access(&self, access: &str) -> Result<Option<Grant>> {
        self.with_deadline("get_by_access", self.lookup(TokenKind::Access, access))
            .await
    }

    async fn get_by_refresh(&self, refresh: &str) -> Result<Option<Grant>> {
        self.with_deadline("get_by_refresh", self.lookup(TokenKind::Refresh, refresh))
            .await
    }
}
