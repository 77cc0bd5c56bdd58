//! OAuth2 grant model.
//!
//! A [`Grant`] is what the authorization server hands to the store after
//! issuing tokens. It is persisted whole, as the payload of the basic
//! record, and handed back unchanged by every lookup.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Kind of token a record is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Authorization code.
    Code,
    /// Access token.
    Access,
    /// Refresh token.
    Refresh,
}

impl TokenKind {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token information issued for one grant event.
///
/// Any subset of `code`, `access` and `refresh` may be empty depending on
/// the grant type: an authorization-code grant carries only the code, a
/// client-credentials grant only an access token, a code exchange or
/// refresh rotation an access token plus an optional refresh token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Client the tokens were issued to.
    #[serde(default)]
    pub client_id: String,

    /// Resource owner, empty for client-credentials grants.
    #[serde(default)]
    pub user_id: String,

    /// Redirect URI bound to the authorization code.
    #[serde(default)]
    pub redirect_uri: String,

    /// Granted scope.
    #[serde(default)]
    pub scope: String,

    /// Authorization code.
    #[serde(default)]
    pub code: String,

    /// PKCE code challenge.
    #[serde(default)]
    pub code_challenge: String,

    /// PKCE code challenge method (`plain` or `S256`).
    #[serde(default)]
    pub code_challenge_method: String,

    /// When the authorization code was issued.
    #[serde(default)]
    pub code_created_at: DateTime<Utc>,

    /// Authorization code lifetime.
    #[serde(default, with = "duration_nanos")]
    pub code_expires_in: Duration,

    /// Access token.
    #[serde(default)]
    pub access: String,

    /// When the access token was issued.
    #[serde(default)]
    pub access_created_at: DateTime<Utc>,

    /// Access token lifetime.
    #[serde(default, with = "duration_nanos")]
    pub access_expires_in: Duration,

    /// Refresh token.
    #[serde(default)]
    pub refresh: String,

    /// When the refresh token was issued.
    #[serde(default)]
    pub refresh_created_at: DateTime<Utc>,

    /// Refresh token lifetime.
    #[serde(default, with = "duration_nanos")]
    pub refresh_expires_in: Duration,
}

impl Grant {
    /// Create an empty grant for a client.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Set the resource owner.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Attach an authorization code.
    #[must_use]
    pub fn with_code(
        mut self,
        code: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        self.code = code.into();
        self.code_created_at = created_at;
        self.code_expires_in = expires_in;
        self
    }

    /// Attach a PKCE challenge to the authorization code.
    #[must_use]
    pub fn with_code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.code_challenge = challenge.into();
        self.code_challenge_method = method.into();
        self
    }

    /// Attach an access token.
    #[must_use]
    pub fn with_access(
        mut self,
        access: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        self.access = access.into();
        self.access_created_at = created_at;
        self.access_expires_in = expires_in;
        self
    }

    /// Attach a refresh token.
    #[must_use]
    pub fn with_refresh(
        mut self,
        refresh: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        self.refresh = refresh.into();
        self.refresh_created_at = created_at;
        self.refresh_expires_in = expires_in;
        self
    }

    /// Returns `true` if the grant carries an authorization code.
    #[must_use]
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    /// Returns `true` if the grant carries an access token.
    #[must_use]
    pub fn has_access(&self) -> bool {
        !self.access.is_empty()
    }

    /// Returns `true` if the grant carries a refresh token.
    #[must_use]
    pub fn has_refresh(&self) -> bool {
        !self.refresh.is_empty()
    }

    /// Token value of the given kind (empty when absent).
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Code => &self.code,
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// When the authorization code expires.
    #[must_use]
    pub fn code_expires_at(&self) -> DateTime<Utc> {
        expires_at(self.code_created_at, self.code_expires_in)
    }

    /// When the access token expires.
    #[must_use]
    pub fn access_expires_at(&self) -> DateTime<Utc> {
        expires_at(self.access_created_at, self.access_expires_in)
    }

    /// When the refresh token expires.
    #[must_use]
    pub fn refresh_expires_at(&self) -> DateTime<Utc> {
        expires_at(self.refresh_created_at, self.refresh_expires_in)
    }

    /// Expiry recorded on the basic record holding this grant.
    ///
    /// The earlier of the code expiry and the refresh expiry, counting only
    /// the tokens the grant actually carries. A grant with neither falls
    /// back to the access token expiry.
    #[must_use]
    pub fn basic_expires_at(&self) -> DateTime<Utc> {
        let code = self.has_code().then(|| self.code_expires_at());
        let refresh = self.has_refresh().then(|| self.refresh_expires_at());

        match (code, refresh) {
            (Some(code), Some(refresh)) => code.min(refresh),
            (Some(at), None) | (None, Some(at)) => at,
            (None, None) => self.access_expires_at(),
        }
    }
}

/// Latest instant `ExpiredAt` can hold: RFC3339 has four-digit years.
const LATEST_EXPIRY_SECS: i64 = 253_402_300_799; // 9999-12-31T23:59:59Z

/// Earliest instant `ExpiredAt` can hold.
const EARLIEST_EXPIRY_SECS: i64 = -62_167_219_200; // 0000-01-01T00:00:00Z

/// `created_at + expires_in`, clamped to the range RFC3339 can represent.
fn expires_at(created_at: DateTime<Utc>, expires_in: Duration) -> DateTime<Utc> {
    let latest =
        DateTime::from_timestamp(LATEST_EXPIRY_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC);
    let earliest =
        DateTime::from_timestamp(EARLIEST_EXPIRY_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);

    let at = created_at
        .checked_add_signed(expires_in)
        .unwrap_or(if expires_in < Duration::zero() { earliest } else { latest });

    at.clamp(earliest, latest)
}

/// Lifetimes travel as whole nanoseconds, so roughly ±292 years at most.
mod duration_nanos {
    use chrono::Duration;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = duration
            .num_nanoseconds()
            .ok_or_else(|| S::Error::custom(format!("lifetime of {duration} is out of range")))?;
        serializer.serialize_i64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::nanoseconds(i64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_builder_sets_token_fields() {
        let grant = Grant::new("client-1")
            .with_user("user-1")
            .with_scope("read write")
            .with_access("A1", t0(), Duration::hours(1))
            .with_refresh("R1", t0(), Duration::days(7));

        assert_eq!(grant.client_id, "client-1");
        assert!(grant.has_access());
        assert!(grant.has_refresh());
        assert!(!grant.has_code());
        assert_eq!(grant.token(TokenKind::Refresh), "R1");
        assert_eq!(grant.access_expires_at(), t0() + Duration::hours(1));
    }

    #[test]
    fn test_basic_expiry_keeps_earlier_of_code_and_refresh() {
        let grant = Grant::new("c")
            .with_code("C1", t0(), Duration::hours(2))
            .with_refresh("R1", t0(), Duration::hours(1));

        assert_eq!(grant.basic_expires_at(), t0() + Duration::hours(1));

        let grant = Grant::new("c")
            .with_code("C1", t0(), Duration::minutes(10))
            .with_refresh("R1", t0(), Duration::hours(1));

        assert_eq!(grant.basic_expires_at(), t0() + Duration::minutes(10));
    }

    #[test]
    fn test_basic_expiry_single_candidates() {
        let code_only = Grant::new("c").with_code("C1", t0(), Duration::minutes(10));
        assert_eq!(code_only.basic_expires_at(), t0() + Duration::minutes(10));

        let refresh = Grant::new("c")
            .with_access("A1", t0(), Duration::hours(1))
            .with_refresh("R1", t0(), Duration::days(14));
        assert_eq!(refresh.basic_expires_at(), t0() + Duration::days(14));

        let access_only = Grant::new("c").with_access("A1", t0(), Duration::hours(1));
        assert_eq!(access_only.basic_expires_at(), t0() + Duration::hours(1));
    }

    #[test]
    fn test_expiry_clamps_to_four_digit_years() {
        let late = Utc.with_ymd_and_hms(9999, 12, 31, 23, 0, 0).unwrap();
        let grant = Grant::new("c").with_access("A1", late, Duration::hours(2));

        assert_eq!(
            grant.access_expires_at(),
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
        );

        let grant = Grant::new("c").with_access("A1", DateTime::<Utc>::MAX_UTC, Duration::days(1));
        assert_eq!(grant.access_expires_at().to_rfc3339(), "9999-12-31T23:59:59+00:00");
    }

    #[test]
    fn test_expiry_clamps_before_year_zero() {
        let grant = Grant::new("c").with_access("A1", DateTime::<Utc>::MIN_UTC, Duration::zero());

        assert_eq!(grant.access_expires_at().to_rfc3339(), "0000-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_json_roundtrip_preserves_all_fields() {
        let grant = Grant::new("client-1")
            .with_user("user-1")
            .with_redirect_uri("https://app.example.com/callback")
            .with_scope("openid")
            .with_code("C1", t0(), Duration::minutes(10))
            .with_code_challenge("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM", "S256");

        let bytes = serde_json::to_vec(&grant).unwrap();
        let decoded: Grant = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, grant);
    }

    #[test]
    fn test_lifetimes_serialize_as_nanoseconds() {
        let grant = Grant::new("c").with_access("A1", t0(), Duration::hours(1));

        let value = serde_json::to_value(&grant).unwrap();

        assert_eq!(value["access_expires_in"], 3_600_000_000_000_i64);
    }

    #[test]
    fn test_sub_second_lifetime_survives_roundtrip() {
        let grant = Grant::new("c").with_access("A1", t0(), Duration::milliseconds(1500));

        let decoded: Grant = serde_json::from_slice(&serde_json::to_vec(&grant).unwrap()).unwrap();

        assert_eq!(decoded.access_expires_in, Duration::milliseconds(1500));
        assert_eq!(decoded, grant);
    }

    #[test]
    fn test_lifetime_beyond_nanosecond_range_fails_to_encode() {
        let grant = Grant::new("c").with_access("A1", t0(), Duration::days(365 * 9000));

        assert!(serde_json::to_vec(&grant).is_err());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let decoded: Grant = serde_json::from_str(r#"{"access":"A1"}"#).unwrap();

        assert_eq!(decoded.access, "A1");
        assert!(decoded.code.is_empty());
        assert_eq!(decoded.refresh_expires_in, Duration::zero());
    }
}
