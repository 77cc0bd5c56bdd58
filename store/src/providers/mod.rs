//! Storage providers.
//!
//! Traits for everything the token store depends on or exposes. The store is
//! generic over them, so tests run against in-memory backends and
//! deterministic ids while production wires in DynamoDB or Redis.
//!
//! ```text
//! OAuth2 server ──GrantStore──▶ TokenStore ──KeyValueStore──▶ backend
//!                                   │
//!                                   └──IdGenerator (basic ids)
//! ```

pub mod grant_store;
pub mod id_generator;
pub mod key_value;

pub use grant_store::GrantStore;
pub use id_generator::{IdGenerator, UuidGenerator};
pub use key_value::{AttributeValue, Item, Key, KeyValueStore, ReadConsistency};
