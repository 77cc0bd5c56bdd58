//! Error types for grant persistence.
//!
//! A missing token is never an error: lookups return `Ok(None)` for it.
//! Every variant below means the operation could not be carried out.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failure modes of the token store and its backends.
///
/// Backend errors keep the driver's message verbatim together with the
/// operation and table that failed, so callers can tell a storage outage
/// apart from "token unknown".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    // ═══════════════════════════════════════════════════════════
    // Record Errors
    // ═══════════════════════════════════════════════════════════

    /// The grant payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored item is missing an attribute or holds the wrong type.
    #[error("Malformed record in {table}: {reason}")]
    MalformedRecord {
        /// Table the item was read from
        table: String,
        /// What was wrong with it
        reason: String,
    },

    /// The grant carries no token the store could key a record by.
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    // ═══════════════════════════════════════════════════════════
    // Backend Errors
    // ═══════════════════════════════════════════════════════════

    /// The backing store rejected or failed a request.
    #[error("Backend {operation} on {table} failed: {message}")]
    Backend {
        /// `put_item`, `get_item` or `delete_item`
        operation: &'static str,
        /// Table the request targeted
        table: String,
        /// Driver error message
        message: String,
    },

    /// Establishing the backend client failed.
    #[error("Connection error: {0}")]
    Connection(String),

    // ═══════════════════════════════════════════════════════════
    // Configuration & Runtime
    // ═══════════════════════════════════════════════════════════

    /// Configuration is incomplete or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation exceeded its configured deadline.
    #[error("Operation {operation} timed out after {timeout:?}")]
    Timeout {
        /// Public operation that timed out
        operation: &'static str,
        /// Deadline that was exceeded
        timeout: std::time::Duration,
    },
}

impl StoreError {
    /// Build a [`StoreError::Backend`] from any driver error.
    pub fn backend(operation: &'static str, table: &str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            operation,
            table: table.to_string(),
            message: err.to_string(),
        }
    }

    /// Build a [`StoreError::MalformedRecord`].
    pub fn malformed(table: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if retrying the same call may succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oauth2_kv_store::StoreError;
    /// assert!(StoreError::backend("get_item", "basic", "throttled").is_transient());
    /// assert!(!StoreError::Serialization("bad json".into()).is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Backend { .. } | Self::Connection(_) | Self::Timeout { .. }
        )
    }

    /// Returns `true` if the error comes from the shape of stored or supplied data.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oauth2_kv_store::StoreError;
    /// assert!(StoreError::malformed("access", "missing BasicID").is_data_error());
    /// assert!(!StoreError::Connection("refused".into()).is_data_error());
    /// ```
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Serialization(_) | Self::MalformedRecord { .. } | Self::InvalidGrant(_)
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_backend_error_keeps_context() {
        let err = StoreError::backend("put_item", "oauth2_access", "ProvisionedThroughputExceeded");

        assert_eq!(
            err.to_string(),
            "Backend put_item on oauth2_access failed: ProvisionedThroughputExceeded"
        );
        assert!(err.is_transient());
        assert!(!err.is_data_error());
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = StoreError::Timeout {
            operation: "get_by_access",
            timeout: Duration::from_millis(250),
        };

        assert!(err.is_transient());
        assert!(err.to_string().contains("get_by_access"));
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let json_err = serde_json::from_slice::<serde_json::Value>(b"{not json")
            .err()
            .map(StoreError::from);

        assert!(matches!(json_err, Some(StoreError::Serialization(_))));
    }

    #[test]
    fn test_configuration_error_is_neither() {
        let err = StoreError::Configuration("basic table name is empty".to_string());

        assert!(!err.is_transient());
        assert!(!err.is_data_error());
    }
}
