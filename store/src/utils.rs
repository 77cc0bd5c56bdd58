//! Utility functions for the token store.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Short, non-reversible fingerprint of a token for log fields.
///
/// Token values are bearer credentials and never go into logs. The first
/// 8 bytes of their SHA-256 digest are enough to correlate log lines.
///
/// # Examples
///
/// ```
/// use oauth2_kv_store::utils::token_fingerprint;
///
/// let fp = token_fingerprint("access-token-value");
/// assert_eq!(fp.len(), 16);
/// assert_eq!(fp, token_fingerprint("access-token-value"));
/// assert_ne!(fp, token_fingerprint("another-token"));
/// ```
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..8].iter().fold(String::with_capacity(16), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}
