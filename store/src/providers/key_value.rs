//! Key-value backend trait.
//!
//! The token store only needs single-item writes, reads and deletes against
//! named tables. Any store offering those (DynamoDB, Redis, an in-memory map)
//! can sit behind [`KeyValueStore`].

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// UTF-8 string.
    S(String),

    /// Opaque bytes.
    B(Vec<u8>),
}

impl AttributeValue {
    /// Borrow the string value, if this is one.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            Self::B(_) => None,
        }
    }

    /// Borrow the binary value, if this is one.
    #[must_use]
    pub fn as_b(&self) -> Option<&[u8]> {
        match self {
            Self::B(b) => Some(b),
            Self::S(_) => None,
        }
    }
}

/// A stored item: attribute name → value.
pub type Item = HashMap<String, AttributeValue>;

/// Primary key of an item.
///
/// Every table used by the token store is keyed by a single string
/// attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    /// Name of the key attribute.
    pub attribute: String,

    /// Key value.
    pub value: String,
}

impl Key {
    /// Create a key on an arbitrary attribute.
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// The key value, provided the key is on `attribute`.
    ///
    /// Backends that index items by a single attribute use this to reject
    /// keys naming any other attribute.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedRecord`] if the key is on a different
    /// attribute.
    pub fn value_on(&self, table: &str, attribute: &str) -> Result<&str> {
        if self.attribute == attribute {
            Ok(&self.value)
        } else {
            Err(StoreError::malformed(
                table,
                format!("key on {} but table is keyed on {attribute}", self.attribute),
            ))
        }
    }
}

/// Read consistency requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadConsistency {
    /// May return a value that lags recent writes.
    #[default]
    Eventual,

    /// Reflects every write acknowledged before the read.
    Strong,
}

impl ReadConsistency {
    /// Map the `consistent_reads` configuration flag.
    #[must_use]
    pub const fn from_flag(consistent_reads: bool) -> Self {
        if consistent_reads {
            Self::Strong
        } else {
            Self::Eventual
        }
    }

    /// Returns `true` for [`ReadConsistency::Strong`].
    #[must_use]
    pub const fn is_strong(self) -> bool {
        matches!(self, Self::Strong)
    }
}

/// Key-value backend.
///
/// # Contract
///
/// - `put_item` replaces any existing item with the same key.
/// - `get_item` returns `Ok(None)` for an absent key. Absence is not an error.
/// - `delete_item` succeeds for an absent key.
/// - Each call is atomic for the single item it touches. Nothing spans items.
///
/// Backends that have no notion of eventual consistency may ignore the
/// requested [`ReadConsistency`].
pub trait KeyValueStore: Send + Sync {
    /// Write an item, replacing any previous item with the same key.
    ///
    /// # Errors
    ///
    /// Returns error if the item has no key attribute or the backend fails.
    fn put_item(
        &self,
        table: &str,
        item: Item,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read an item by key.
    ///
    /// # Returns
    ///
    /// - `Some(item)` if found
    /// - `None` if no item exists for the key
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn get_item(
        &self,
        table: &str,
        key: &Key,
        consistency: ReadConsistency,
    ) -> impl std::future::Future<Output = Result<Option<Item>>> + Send;

    /// Delete an item by key.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails. A missing key is not an error.
    fn delete_item(
        &self,
        table: &str,
        key: &Key,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
