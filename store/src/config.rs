//! Token store configuration.
//!
//! Values are supplied by the application. [`StoreConfig::from_env`] reads
//! the `OAUTH2_STORE_*` variables for deployments that configure through the
//! environment.

use crate::error::{Result, StoreError};
use std::time::Duration;

/// Names of the three tables the store writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Table holding full grant payloads.
    ///
    /// Default: `oauth2_basic`
    pub basic: String,

    /// Table indexing access tokens.
    ///
    /// Default: `oauth2_access`
    pub access: String,

    /// Table indexing refresh tokens.
    ///
    /// Default: `oauth2_refresh`
    pub refresh: String,
}

impl TableConfig {
    /// Create a table configuration.
    #[must_use]
    pub const fn new(basic: String, access: String, refresh: String) -> Self {
        Self {
            basic,
            access,
            refresh,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            basic: "oauth2_basic".to_string(),
            access: "oauth2_access".to_string(),
            refresh: "oauth2_refresh".to_string(),
        }
    }
}

/// Static access key credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// Access key id.
    pub access_key_id: String,

    /// Secret access key.
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Token store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend region (e.g. "eu-west-1"). `None` defers to the driver's
    /// default resolution.
    pub region: Option<String>,

    /// Endpoint override (e.g. "http://localhost:8000" for DynamoDB Local).
    pub endpoint: Option<String>,

    /// Static credentials. `None` defers to the driver's credential chain.
    pub credentials: Option<StaticCredentials>,

    /// Table names.
    pub tables: TableConfig,

    /// Request strongly consistent reads.
    ///
    /// Default: `false`
    pub consistent_reads: bool,

    /// Deadline applied to each public store operation.
    ///
    /// Default: none
    pub operation_timeout: Option<Duration>,
}

impl StoreConfig {
    /// Create a configuration for the given tables.
    #[must_use]
    pub const fn new(tables: TableConfig) -> Self {
        Self {
            region: None,
            endpoint: None,
            credentials: None,
            tables,
            consistent_reads: false,
            operation_timeout: None,
        }
    }

    /// Set the region. An empty string leaves it unset.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = non_empty(region.into());
        self
    }

    /// Set the endpoint override. An empty string leaves it unset.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = non_empty(endpoint.into());
        self
    }

    /// Set static credentials.
    ///
    /// Credentials only apply when both the key id and the secret are
    /// non-empty; otherwise the driver's credential chain is used.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        self.credentials = (!access_key_id.is_empty() && !secret_access_key.is_empty()).then(
            || StaticCredentials {
                access_key_id,
                secret_access_key,
            },
        );
        self
    }

    /// Toggle strongly consistent reads.
    #[must_use]
    pub const fn with_consistent_reads(mut self, consistent_reads: bool) -> Self {
        self.consistent_reads = consistent_reads;
        self
    }

    /// Set a per-operation deadline.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if a table name is empty or the
    /// operation timeout is zero.
    pub fn validate(&self) -> Result<()> {
        for (kind, name) in [
            ("basic", &self.tables.basic),
            ("access", &self.tables.access),
            ("refresh", &self.tables.refresh),
        ] {
            if name.trim().is_empty() {
                return Err(StoreError::Configuration(format!(
                    "{kind} table name is empty"
                )));
            }
        }

        if self.operation_timeout.is_some_and(|t| t.is_zero()) {
            return Err(StoreError::Configuration(
                "operation timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from `OAUTH2_STORE_*` environment variables.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `OAUTH2_STORE_REGION` | region |
    /// | `OAUTH2_STORE_ENDPOINT` | endpoint override |
    /// | `OAUTH2_STORE_ACCESS_KEY` / `OAUTH2_STORE_SECRET_KEY` | static credentials |
    /// | `OAUTH2_STORE_BASIC_TABLE` | basic table (default `oauth2_basic`) |
    /// | `OAUTH2_STORE_ACCESS_TABLE` | access table (default `oauth2_access`) |
    /// | `OAUTH2_STORE_REFRESH_TABLE` | refresh table (default `oauth2_refresh`) |
    /// | `OAUTH2_STORE_CONSISTENT_READS` | `true`/`false` (default `false`) |
    /// | `OAUTH2_STORE_TIMEOUT_MS` | per-operation deadline in milliseconds |
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if a value cannot be parsed or
    /// the resulting configuration fails [`StoreConfig::validate`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StoreConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TableConfig::default();
        let table = |name: &str, default: String| lookup(name).and_then(non_empty).unwrap_or(default);

        let tables = TableConfig::new(
            table("OAUTH2_STORE_BASIC_TABLE", defaults.basic),
            table("OAUTH2_STORE_ACCESS_TABLE", defaults.access),
            table("OAUTH2_STORE_REFRESH_TABLE", defaults.refresh),
        );

        let mut config = Self::new(tables)
            .with_region(lookup("OAUTH2_STORE_REGION").unwrap_or_default())
            .with_endpoint(lookup("OAUTH2_STORE_ENDPOINT").unwrap_or_default())
            .with_credentials(
                lookup("OAUTH2_STORE_ACCESS_KEY").unwrap_or_default(),
                lookup("OAUTH2_STORE_SECRET_KEY").unwrap_or_default(),
            );

        if let Some(raw) = lookup("OAUTH2_STORE_CONSISTENT_READS").and_then(non_empty) {
            let flag = raw.trim().parse::<bool>().map_err(|_| {
                StoreError::Configuration(format!(
                    "OAUTH2_STORE_CONSISTENT_READS must be true or false, got {raw:?}"
                ))
            })?;
            config = config.with_consistent_reads(flag);
        }

        if let Some(raw) = lookup("OAUTH2_STORE_TIMEOUT_MS").and_then(non_empty) {
            let millis = raw.trim().parse::<u64>().map_err(|_| {
                StoreError::Configuration(format!(
                    "OAUTH2_STORE_TIMEOUT_MS must be a whole number of milliseconds, got {raw:?}"
                ))
            })?;
            config = config.with_operation_timeout(Duration::from_millis(millis));
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_store_config_builder() {
        let config = StoreConfig::default()
            .with_region("eu-west-1")
            .with_endpoint("http://localhost:8000")
            .with_credentials("AKIA", "secret")
            .with_consistent_reads(true)
            .with_operation_timeout(Duration::from_secs(2));

        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(
            config.credentials.as_ref().map(|c| c.access_key_id.as_str()),
            Some("AKIA")
        );
        assert!(config.consistent_reads);
        assert_eq!(config.operation_timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_empty_values_leave_settings_unset() {
        let config = StoreConfig::default()
            .with_region("")
            .with_endpoint("")
            .with_credentials("AKIA", "");

        assert!(config.region.is_none());
        assert!(config.endpoint.is_none());
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();

        assert_eq!(config.tables.basic, "oauth2_basic");
        assert_eq!(config.tables.access, "oauth2_access");
        assert_eq!(config.tables.refresh, "oauth2_refresh");
        assert!(!config.consistent_reads);
        assert!(config.operation_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_table() {
        let config = StoreConfig::new(TableConfig::new(
            "basic".to_string(),
            " ".to_string(),
            "refresh".to_string(),
        ));

        assert_eq!(
            config.validate(),
            Err(StoreError::Configuration("access table name is empty".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = StoreConfig::default().with_operation_timeout(Duration::ZERO);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let config = StoreConfig::default().with_credentials("AKIA", "super-secret");

        let rendered = format!("{config:?}");

        assert!(rendered.contains("AKIA"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("OAUTH2_STORE_REGION", "us-east-1"),
            ("OAUTH2_STORE_ENDPOINT", "http://localhost:8000"),
            ("OAUTH2_STORE_ACCESS_KEY", "key"),
            ("OAUTH2_STORE_SECRET_KEY", "secret"),
            ("OAUTH2_STORE_BASIC_TABLE", "b"),
            ("OAUTH2_STORE_ACCESS_TABLE", "a"),
            ("OAUTH2_STORE_REFRESH_TABLE", "r"),
            ("OAUTH2_STORE_CONSISTENT_READS", "true"),
            ("OAUTH2_STORE_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.region.as_deref(), Some("us-east-1"));
        assert_eq!(config.tables, TableConfig::new("b".into(), "a".into(), "r".into()));
        assert!(config.credentials.is_some());
        assert!(config.consistent_reads);
        assert_eq!(config.operation_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_bad_flag() {
        let result = StoreConfig::from_lookup(lookup_from(&[(
            "OAUTH2_STORE_CONSISTENT_READS",
            "yes please",
        )]));

        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_from_lookup_rejects_zero_timeout() {
        let result = StoreConfig::from_lookup(lookup_from(&[("OAUTH2_STORE_TIMEOUT_MS", "0")]));

        assert!(result.is_err());
    }
}
