//! # OAuth2 KV Store
//!
//! Storage backend for an OAuth2 authorization server: persists
//! authorization codes, access tokens and refresh tokens in a key-value
//! store and resolves each of them back to the grant it was issued under.
//!
//! ## Features
//!
//! - **Three tables**: basic (full grant), access index, refresh index
//! - **Two-hop lookup**: token → `BasicID` → grant
//! - **Independent revocation**: each token is removed on its own
//! - **Pluggable backends**: in-memory, Redis, DynamoDB (feature `dynamodb`)
//! - **Explicit misses**: unknown tokens are `Ok(None)`, never an error
//!
//! ## Architecture
//!
//! ```text
//! Grant ──create──▶ basic[code | id] ◀──BasicID── access[token]
//!                                    ◀──BasicID── refresh[token]
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use oauth2_kv_store::*;
//!
//! let config = StoreConfig::from_env()?;
//! let backend = stores::RedisKeyValueStore::new("redis://127.0.0.1:6379").await?;
//! let store = TokenStore::new(backend, config)?;
//!
//! // Authorization endpoint
//! store.create(&Grant::new(client_id).with_code(code, now, Duration::minutes(10))).await?;
//!
//! // Token endpoint
//! if let Some(grant) = store.get_by_code(&code).await? {
//!     store.remove_by_code(&code).await?;
//!     store.create(&issued_tokens).await?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod error;
pub mod grant;
pub mod providers;
pub mod records;
pub mod stores;
pub mod token_store;
pub mod utils;

// Re-export main types for convenience
pub use config::{StaticCredentials, StoreConfig, TableConfig};
pub use error::{Result, StoreError};
pub use grant::{Grant, TokenKind};
pub use providers::{GrantStore, IdGenerator, KeyValueStore, ReadConsistency, UuidGenerator};
pub use token_store::TokenStore;
