//! Grant storage trait.
//!
//! The interface an OAuth2 authorization server consumes to persist issued
//! tokens and resolve them later.

use crate::error::Result;
use crate::grant::Grant;

/// Grant store.
///
/// Every token an authorization server issues (code, access, refresh) must
/// resolve back to the [`Grant`] it was issued under.
///
/// # Miss semantics
///
/// Lookups return `Ok(None)` when the token is unknown, expired out of the
/// store, or points at a record that has since been removed. An `Err` always
/// means the store itself failed.
///
/// # Revocation
///
/// Each `remove_by_*` deletes exactly one record. Revoking a whole grant
/// takes one call per token it carries.
///
/// # Example
///
/// ```ignore
/// // Authorization endpoint: persist the code
/// grants.create(&Grant::new("client").with_code(code, now, Duration::minutes(10))).await?;
///
/// // Token endpoint: exchange it
/// let Some(grant) = grants.get_by_code(&code).await? else {
///     return Err(invalid_grant());
/// };
/// grants.remove_by_code(&code).await?;
/// grants.create(&issued).await?;
/// ```
pub trait GrantStore: Send + Sync {
    /// Persist the records needed to resolve every token of the grant.
    ///
    /// # Errors
    ///
    /// Returns error if the grant carries no token, serialization fails, or
    /// a backend write fails. Records written before the failing write stay
    /// in place.
    fn create(&self, grant: &Grant) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete the record keyed by an authorization code.
    ///
    /// # Errors
    ///
    /// Returns error if the backend delete fails.
    fn remove_by_code(&self, code: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete the record keyed by an access token.
    ///
    /// # Errors
    ///
    /// Returns error if the backend delete fails.
    fn remove_by_access(
        &self,
        access: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete the record keyed by a refresh token.
    ///
    /// # Errors
    ///
    /// Returns error if the backend delete fails.
    fn remove_by_refresh(
        &self,
        refresh: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Resolve an authorization code.
    ///
    /// # Errors
    ///
    /// Returns error if the backend read or payload decoding fails.
    fn get_by_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Option<Grant>>> + Send;

    /// Resolve an access token.
    ///
    /// # Errors
    ///
    /// Returns error if a backend read or payload decoding fails.
    fn get_by_access(
        &self,
        access: &str,
    ) -> impl std::future::Future<Output = Result<Option<Grant>>> + Send;

    /// Resolve a refresh token.
    ///
    /// # Errors
    ///
    /// Returns error if a backend read or payload decoding fails.
    fn get_by_refresh(
        &self,
        refresh: &str,
    ) -> impl std::future::Future<Output = Result<Option<Grant>>> + Send;
}
