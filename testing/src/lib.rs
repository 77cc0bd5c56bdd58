//! # OAuth2 KV Store Testing
//!
//! Testing utilities and helpers for `oauth2-kv-store`.
//!
//! This crate provides:
//! - A fault-injecting, call-recording key-value backend
//! - A deterministic basic id generator
//! - Grant fixtures for each OAuth2 grant shape
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```
//! use oauth2_kv_store::GrantStore;
//! use oauth2_kv_store_testing::helpers::{access_grant, memory_token_store};
//!
//! # async fn example() -> oauth2_kv_store::Result<()> {
//! let (store, backend) = memory_token_store();
//!
//! store.create(&access_grant("A1")).await?;
//!
//! assert!(store.get_by_access("A1").await?.is_some());
//! assert_eq!(backend.len("oauth2_access")?, 1);
//! # Ok(())
//! # }
//! ```

mod faulty_store;

pub use faulty_store::{BackendCall, FaultyKeyValueStore};

/// Mock implementations of provider traits.
pub mod mocks {
    use chrono::{DateTime, TimeZone, Utc};
    use oauth2_kv_store::IdGenerator;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Predictable basic ids: `basic-1`, `basic-2`, ...
    ///
    /// Clones share the counter.
    ///
    /// # Example
    ///
    /// ```
    /// use oauth2_kv_store::IdGenerator;
    /// use oauth2_kv_store_testing::mocks::SequentialIdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), "basic-1");
    /// assert_eq!(ids.next_id(), "basic-2");
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct SequentialIdGenerator {
        next: Arc<AtomicU64>,
    }

    impl SequentialIdGenerator {
        /// Create a generator starting at `basic-1`.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of ids handed out so far.
        #[must_use]
        pub fn issued(&self) -> u64 {
            self.next.load(Ordering::SeqCst)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            format!("basic-{n}")
        }
    }

    /// Fixed issue time for fixtures (2025-01-01 00:00:00 UTC).
    #[must_use]
    pub fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

/// Test helpers and fixtures.
pub mod helpers {
    use super::FaultyKeyValueStore;
    use super::mocks::{SequentialIdGenerator, test_time};
    use chrono::Duration;
    use oauth2_kv_store::stores::InMemoryKeyValueStore;
    use oauth2_kv_store::{Grant, StoreConfig, TokenStore};

    /// Client id used by every fixture.
    pub const TEST_CLIENT: &str = "test-client";

    /// Authorization-code grant: code valid for 10 minutes.
    #[must_use]
    pub fn code_grant(code: &str) -> Grant {
        Grant::new(TEST_CLIENT)
            .with_user("test-user")
            .with_redirect_uri("https://client.example.com/callback")
            .with_scope("read write")
            .with_code(code, test_time(), Duration::minutes(10))
    }

    /// Client-credentials style grant: access token valid for 1 hour.
    #[must_use]
    pub fn access_grant(access: &str) -> Grant {
        Grant::new(TEST_CLIENT)
            .with_scope("read")
            .with_access(access, test_time(), Duration::hours(1))
    }

    /// Code exchange / refresh rotation grant: access for 1 hour, refresh
    /// for 7 days.
    #[must_use]
    pub fn refresh_grant(access: &str, refresh: &str) -> Grant {
        Grant::new(TEST_CLIENT)
            .with_user("test-user")
            .with_scope("read write")
            .with_access(access, test_time(), Duration::hours(1))
            .with_refresh(refresh, test_time(), Duration::days(7))
    }

    /// Token store over a fresh in-memory backend with sequential ids.
    ///
    /// Returns the store and a handle on the backend for inspection.
    ///
    /// # Panics
    ///
    /// Never: the default configuration always validates.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn memory_token_store() -> (
        TokenStore<InMemoryKeyValueStore, SequentialIdGenerator>,
        InMemoryKeyValueStore,
    ) {
        let backend = InMemoryKeyValueStore::new();
        let store = TokenStore::with_id_generator(
            backend.clone(),
            StoreConfig::default(),
            SequentialIdGenerator::new(),
        )
        .expect("default configuration should validate");
        (store, backend)
    }

    /// Token store over a fault-injecting backend with sequential ids.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn faulty_token_store(
        backend: FaultyKeyValueStore,
        config: StoreConfig,
    ) -> TokenStore<FaultyKeyValueStore, SequentialIdGenerator> {
        TokenStore::with_id_generator(backend, config, SequentialIdGenerator::new())
            .expect("test configuration should validate")
    }

    /// Install a `tracing` subscriber honouring `RUST_LOG`, once per process.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing strategies.
pub mod properties {
    use chrono::{DateTime, Duration, Utc};
    use oauth2_kv_store::Grant;
    use proptest::prelude::*;

    /// Non-empty token strings.
    pub fn token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{8,40}"
    }

    /// Issue times between 2000 and 2100, whole seconds.
    pub fn issued_at() -> impl Strategy<Value = DateTime<Utc>> {
        (946_684_800_i64..4_102_444_800_i64)
            .prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    /// Lifetimes between one millisecond and one year, millisecond precision.
    pub fn lifetime() -> impl Strategy<Value = Duration> {
        (1_i64..31_536_000_000_i64).prop_map(Duration::milliseconds)
    }

    fn metadata() -> impl Strategy<Value = Grant> {
        ("[a-z0-9-]{1,20}", "[a-z0-9-]{0,20}", "[a-z ]{0,30}").prop_map(
            |(client_id, user_id, scope)| Grant::new(client_id).with_user(user_id).with_scope(scope),
        )
    }

    /// Grants carrying only an authorization code.
    pub fn code_grant() -> impl Strategy<Value = Grant> {
        (metadata(), token(), issued_at(), lifetime())
            .prop_map(|(grant, code, at, ttl)| grant.with_code(code, at, ttl))
    }

    /// Grants carrying an access token and no code.
    pub fn access_grant() -> impl Strategy<Value = Grant> {
        (metadata(), token(), issued_at(), lifetime())
            .prop_map(|(grant, access, at, ttl)| grant.with_access(access, at, ttl))
    }

    /// Grants carrying an access and a refresh token and no code.
    ///
    /// The two tokens are always distinct.
    pub fn refresh_grant() -> impl Strategy<Value = Grant> {
        (access_grant(), token(), issued_at(), lifetime())
            .prop_filter("access and refresh must differ", |(grant, refresh, _, _)| {
                grant.access != *refresh
            })
            .prop_map(|(grant, refresh, at, ttl)| grant.with_refresh(refresh, at, ttl))
    }
}
