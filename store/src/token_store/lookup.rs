//! Lookup: code → basic record, access/refresh → index record → basic record.

use super::TokenStore;
use crate::error::Result;
use crate::grant::{Grant, TokenKind};
use crate::providers::{IdGenerator, KeyValueStore};
use crate::records::{id_key, BasicRecord, IndexRecord};
use crate::utils::token_fingerprint;

impl<S: KeyValueStore, G: IdGenerator> TokenStore<S, G> {
    pub(super) async fn lookup(&self, kind: TokenKind, token: &str) -> Result<Option<Grant>> {
        if token.is_empty() {
            return Ok(None);
        }

        let basic_id = match kind {
            TokenKind::Code => token.to_string(),
            TokenKind::Access | TokenKind::Refresh => {
                match self.resolve_basic_id(kind, token).await? {
                    Some(basic_id) => basic_id,
                    None => return Ok(None),
                }
            }
        };

        self.load_grant(&basic_id).await
    }

    /// Follow an access or refresh token to the id of its basic record.
    async fn resolve_basic_id(&self, kind: TokenKind, token: &str) -> Result<Option<String>> {
        let table = self.table(kind);

        let Some(item) = self
            .backend
            .get_item(table, &id_key(token), self.consistency())
            .await?
        else {
            tracing::debug!(
                table,
                token_kind = %kind,
                fingerprint = %token_fingerprint(token),
                "Token not found"
            );
            return Ok(None);
        };

        let record = IndexRecord::from_item(table, &item)?;

        if record.basic_id.is_empty() {
            tracing::warn!(
                table,
                token_kind = %kind,
                fingerprint = %token_fingerprint(token),
                "Index record has no BasicID"
            );
            return Ok(None);
        }

        Ok(Some(record.basic_id))
    }

    async fn load_grant(&self, basic_id: &str) -> Result<Option<Grant>> {
        let table = self.table(TokenKind::Code);

        let Some(item) = self
            .backend
            .get_item(table, &id_key(basic_id), self.consistency())
            .await?
        else {
            // Also reached when an index record outlives its basic record.
            tracing::debug!(
                table,
                fingerprint = %token_fingerprint(basic_id),
                "Basic record not found"
            );
            return Ok(None);
        };

        let grant = BasicRecord::from_item(table, &item)?.grant()?;

        tracing::debug!(
            table,
            fingerprint = %token_fingerprint(basic_id),
            client_id = %grant.client_id,
            "Resolved grant"
        );

        Ok(Some(grant))
    }
}
