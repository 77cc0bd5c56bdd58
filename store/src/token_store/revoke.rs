//! Revoke: delete one record from the table matching the token kind.

use super::TokenStore;
use crate::error::Result;
use crate::grant::TokenKind;
use crate::providers::{IdGenerator, KeyValueStore};
use crate::records::id_key;
use crate::utils::token_fingerprint;

impl<S: KeyValueStore, G: IdGenerator> TokenStore<S, G> {
    pub(super) async fn revoke(&self, kind: TokenKind, token: &str) -> Result<()> {
        if token.is_empty() {
            return Ok(());
        }

        let table = self.table(kind);

        match self.backend.delete_item(table, &id_key(token)).await {
            Ok(()) => {
                tracing::info!(
                    table,
                    token_kind = %kind,
                    fingerprint = %token_fingerprint(token),
                    "Removed token record"
                );
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    table,
                    token_kind = %kind,
                    fingerprint = %token_fingerprint(token),
                    error = %error,
                    "Failed to remove token record"
                );
                Err(error)
            }
        }
    }
}
