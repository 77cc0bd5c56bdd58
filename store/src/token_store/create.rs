//! Create chain: one grant → basic record plus zero, one or two index records.

use super::TokenStore;
use crate::error::{Result, StoreError};
use crate::grant::{Grant, TokenKind};
use crate::providers::{IdGenerator, KeyValueStore};
use crate::records::{format_timestamp, BasicRecord, IndexRecord};
use crate::utils::token_fingerprint;
use chrono::{DateTime, Utc};

impl<S: KeyValueStore, G: IdGenerator> TokenStore<S, G> {
    /// Dispatch on the tokens the grant carries.
    ///
    /// A code grant is stored on its own: the code is exchanged for tokens
    /// in a later, separate `create`.
    pub(super) async fn create_records(&self, grant: &Grant) -> Result<()> {
        if grant.has_code() {
            return self.create_with_code(grant).await;
        }

        if grant.has_refresh() {
            self.create_with_refresh(grant).await
        } else if grant.has_access() {
            let basic_id = self.ids.next_id();
            self.create_with_access(grant, &basic_id).await
        } else {
            Err(StoreError::InvalidGrant(
                "grant carries no authorization code, access token or refresh token".to_string(),
            ))
        }
    }

    async fn create_with_code(&self, grant: &Grant) -> Result<()> {
        self.put_basic(&grant.code, grant).await
    }

    async fn create_with_refresh(&self, grant: &Grant) -> Result<()> {
        let basic_id = self.ids.next_id();
        self.create_with_access(grant, &basic_id).await?;
        self.put_index(
            TokenKind::Refresh,
            &grant.refresh,
            &basic_id,
            grant.refresh_expires_at(),
        )
        .await
    }

    async fn create_with_access(&self, grant: &Grant, basic_id: &str) -> Result<()> {
        self.put_basic(basic_id, grant).await?;

        // Refresh-only grants have nothing to index here.
        if !grant.has_access() {
            return Ok(());
        }

        self.put_index(
            TokenKind::Access,
            &grant.access,
            basic_id,
            grant.access_expires_at(),
        )
        .await
    }

    async fn put_basic(&self, basic_id: &str, grant: &Grant) -> Result<()> {
        let table = self.table(TokenKind::Code);
        let record = BasicRecord::for_grant(basic_id, grant)?;
        let expired_at = record.expired_at;

        self.backend.put_item(table, record.into_item()).await?;

        tracing::info!(
            table,
            fingerprint = %token_fingerprint(basic_id),
            client_id = %grant.client_id,
            expired_at = %format_timestamp(expired_at),
            "Stored basic record"
        );

        Ok(())
    }

    async fn put_index(
        &self,
        kind: TokenKind,
        token: &str,
        basic_id: &str,
        expired_at: DateTime<Utc>,
    ) -> Result<()> {
        let table = self.table(kind);
        let record = IndexRecord::new(token, basic_id, expired_at);

        self.backend.put_item(table, record.into_item()).await?;

        tracing::info!(
            table,
            token_kind = %kind,
            fingerprint = %token_fingerprint(token),
            basic_fingerprint = %token_fingerprint(basic_id),
            expired_at = %format_timestamp(expired_at),
            "Stored index record"
        );

        Ok(())
    }
}
