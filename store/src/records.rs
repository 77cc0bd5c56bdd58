//! Stored record shapes and their item encoding.
//!
//! Basic table items: `{ID, Data, ExpiredAt}`, where `Data` is the
//! JSON-encoded grant. Access and refresh table items:
//! `{ID, BasicID, ExpiredAt}`. `ExpiredAt` is an RFC3339 string in UTC,
//! with fractional seconds only when they are non-zero.

use crate::error::{Result, StoreError};
use crate::grant::Grant;
use crate::providers::{AttributeValue, Item, Key};
use chrono::{DateTime, SecondsFormat, Utc};

/// Key attribute shared by all three tables.
pub const ID_ATTRIBUTE: &str = "ID";
/// Serialized grant payload (basic table).
pub const DATA_ATTRIBUTE: &str = "Data";
/// Pointer to the basic record (access and refresh tables).
pub const BASIC_ID_ATTRIBUTE: &str = "BasicID";
/// Advisory expiry timestamp.
pub const EXPIRED_AT_ATTRIBUTE: &str = "ExpiredAt";

/// Key on the `ID` attribute.
#[must_use]
pub fn id_key(id: &str) -> Key {
    Key::new(ID_ATTRIBUTE, id)
}

/// Full grant payload, keyed by authorization code or internal id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicRecord {
    /// Authorization code, or a generated id for code-less grants.
    pub id: String,

    /// JSON-encoded [`Grant`].
    pub payload: Vec<u8>,

    /// Advisory expiry.
    pub expired_at: DateTime<Utc>,
}

impl BasicRecord {
    /// Build the basic record for a grant under the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the grant cannot be encoded.
    pub fn for_grant(id: impl Into<String>, grant: &Grant) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            payload: serde_json::to_vec(grant)?,
            expired_at: grant.basic_expires_at(),
        })
    }

    /// Decode the grant payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the payload is not a grant.
    pub fn grant(&self) -> Result<Grant> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    /// Encode as a backend item.
    #[must_use]
    pub fn into_item(self) -> Item {
        Item::from([
            (ID_ATTRIBUTE.to_string(), AttributeValue::S(self.id)),
            (DATA_ATTRIBUTE.to_string(), AttributeValue::B(self.payload)),
            (
                EXPIRED_AT_ATTRIBUTE.to_string(),
                AttributeValue::S(format_timestamp(self.expired_at)),
            ),
        ])
    }

    /// Decode a backend item read from `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedRecord`] if `ID` or `Data` is missing,
    /// or any attribute has the wrong type. A missing `ExpiredAt` decodes as
    /// the epoch.
    pub fn from_item(table: &str, item: &Item) -> Result<Self> {
        Ok(Self {
            id: string_attribute(table, item, ID_ATTRIBUTE)?.to_string(),
            payload: binary_attribute(table, item, DATA_ATTRIBUTE)?.to_vec(),
            expired_at: timestamp_attribute(table, item)?,
        })
    }
}

/// Pointer from an access or refresh token to its basic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// The token value.
    pub id: String,

    /// Id of the basic record holding the grant.
    pub basic_id: String,

    /// Advisory expiry of the token itself.
    pub expired_at: DateTime<Utc>,
}

impl IndexRecord {
    /// Create an index record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        basic_id: impl Into<String>,
        expired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            basic_id: basic_id.into(),
            expired_at,
        }
    }

    /// Encode as a backend item.
    #[must_use]
    pub fn into_item(self) -> Item {
        Item::from([
            (ID_ATTRIBUTE.to_string(), AttributeValue::S(self.id)),
            (BASIC_ID_ATTRIBUTE.to_string(), AttributeValue::S(self.basic_id)),
            (
                EXPIRED_AT_ATTRIBUTE.to_string(),
                AttributeValue::S(format_timestamp(self.expired_at)),
            ),
        ])
    }

    /// Decode a backend item read from `table`.
    ///
    /// A missing `BasicID` decodes as an empty pointer, which lookups treat
    /// as a miss.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedRecord`] if `ID` is missing, or any
    /// attribute has the wrong type. A missing `ExpiredAt` decodes as the
    /// epoch.
    pub fn from_item(table: &str, item: &Item) -> Result<Self> {
        let basic_id = match item.get(BASIC_ID_ATTRIBUTE) {
            Some(value) => value
                .as_s()
                .ok_or_else(|| StoreError::malformed(table, "BasicID is not a string"))?
                .to_string(),
            None => String::new(),
        };

        Ok(Self {
            id: string_attribute(table, item, ID_ATTRIBUTE)?.to_string(),
            basic_id,
            expired_at: timestamp_attribute(table, item)?,
        })
    }
}

/// Format a timestamp the way `ExpiredAt` is stored.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn string_attribute<'a>(table: &str, item: &'a Item, name: &str) -> Result<&'a str> {
    item.get(name)
        .ok_or_else(|| StoreError::malformed(table, format!("missing {name}")))?
        .as_s()
        .ok_or_else(|| StoreError::malformed(table, format!("{name} is not a string")))
}

fn binary_attribute<'a>(table: &str, item: &'a Item, name: &str) -> Result<&'a [u8]> {
    item.get(name)
        .ok_or_else(|| StoreError::malformed(table, format!("missing {name}")))?
        .as_b()
        .ok_or_else(|| StoreError::malformed(table, format!("{name} is not binary")))
}

/// `ExpiredAt` is advisory: a record without one decodes as expired at the epoch.
fn timestamp_attribute(table: &str, item: &Item) -> Result<DateTime<Utc>> {
    if !item.contains_key(EXPIRED_AT_ATTRIBUTE) {
        return Ok(DateTime::<Utc>::UNIX_EPOCH);
    }

    let raw = string_attribute(table, item, EXPIRED_AT_ATTRIBUTE)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::malformed(table, format!("ExpiredAt {raw:?}: {e}")))
}
