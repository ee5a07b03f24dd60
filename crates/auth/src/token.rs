use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application-defined key/value facts carried inside a token.
pub type Claims = HashMap<String, String>;

/// Out-of-band response metadata supplied by a verifier (never sealed into a token).
pub type Properties = HashMap<String, String>;

/// Token type of tokens presented to resource servers.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Token type of long-lived tokens used to obtain new access tokens.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// An authenticated grant, as sealed into an opaque bearer string.
///
/// Tokens are built once by the provider and never mutated afterwards; a
/// decrypted token is rebuilt from the opaque string on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Principal the token was issued to (user or client id).
    pub credential: String,

    pub claims: Claims,

    /// Permission set, opaque at this layer.
    pub scope: String,

    /// Discriminator such as "access" or "refresh".
    pub token_type: String,

    pub token_id: String,
    pub refresh_token_id: String,

    /// Issue time (UTC).
    pub creation_date: DateTime<Utc>,

    /// Validity window starting at `creation_date`.
    pub expires_in: Duration,
}

impl Token {
    /// Instant after which the token is no longer valid.
    ///
    /// `None` when the window runs past the representable time range, in which
    /// case the token never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let window = chrono::Duration::from_std(self.expires_in).ok()?;
        self.creation_date.checked_add_signed(window)
    }

    /// A token is valid at `now` iff `now <= creation_date + expires_in`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => now <= expires_at,
            None => true,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_valid_at(now)
    }
}

/// The caller-supplied part of a token; the provider adds the clock stamp and
/// validity window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenDraft {
    pub credential: String,
    pub scope: String,
    pub token_type: String,
    pub claims: Claims,
    pub token_id: String,
    pub refresh_token_id: String,
}

impl TokenDraft {
    pub fn new(
        credential: impl Into<String>,
        scope: impl Into<String>,
        token_type: impl Into<String>,
    ) -> Self {
        Self {
            credential: credential.into(),
            scope: scope.into(),
            token_type: token_type.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_claims(mut self, claims: Claims) -> Self {
        self.claims = claims;
        self
    }

    #[must_use]
    pub fn with_ids(mut self, token_id: impl Into<String>, refresh_token_id: impl Into<String>) -> Self {
        self.token_id = token_id.into();
        self.refresh_token_id = refresh_token_id.into();
        self
    }

    pub(crate) fn stamp(self, creation_date: DateTime<Utc>, expires_in: Duration) -> Token {
        Token {
            credential: self.credential,
            claims: self.claims,
            scope: self.scope,
            token_type: self.token_type,
            token_id: self.token_id,
            refresh_token_id: self.refresh_token_id,
            creation_date,
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token_at(creation_date: DateTime<Utc>, expires_in: Duration) -> Token {
        TokenDraft::new("user01", "", ACCESS_TOKEN_TYPE).stamp(creation_date, expires_in)
    }

    #[test]
    fn valid_up_to_and_including_the_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let ttl = Duration::from_secs(3600);
        let boundary = token_at(now - chrono::Duration::seconds(3600), ttl);

        assert!(boundary.is_valid_at(now));
        assert!(boundary.is_expired_at(now + chrono::Duration::nanoseconds(1)));
    }

    #[test]
    fn still_valid_one_millisecond_before_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let ttl = Duration::from_secs(3600);
        let token = token_at(
            now - chrono::Duration::seconds(3600) + chrono::Duration::milliseconds(1),
            ttl,
        );

        assert!(token.is_valid_at(now));
    }

    #[test]
    fn unrepresentable_window_never_expires() {
        let token = token_at(Utc::now(), Duration::MAX);
        assert_eq!(token.expires_at(), None);
        assert!(token.is_valid_at(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn empty_credential_is_an_ordinary_value() {
        let token = TokenDraft::new("", "", ACCESS_TOKEN_TYPE)
            .stamp(Utc::now(), Duration::from_secs(60));
        assert!(token.credential.is_empty());
        assert!(token.is_valid_at(token.creation_date));
    }
}
