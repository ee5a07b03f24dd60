use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{Claims, SecureFormatter, Token, TokenDraft, VerifierError};

/// Lifetime applied to tokens when none is configured.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The opaque string could not be opened (garbage or tampered input).
    #[error("malformed token")]
    MalformedToken,

    /// Tokens are never minted for an empty credential.
    #[error("credential must not be empty")]
    MissingCredential,

    #[error("failed to encode token: {0}")]
    Encoding(String),

    #[error(transparent)]
    Verifier(#[from] VerifierError),
}

/// The only component that creates or interprets tokens.
///
/// Stateless apart from the immutable formatter; share it behind an `Arc`.
/// Expiry is *not* checked here: callers decide what "now" means.
pub struct TokenProvider {
    formatter: Box<dyn SecureFormatter>,
    expires_in: Duration,
}

impl TokenProvider {
    pub fn new(formatter: impl SecureFormatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            expires_in: DEFAULT_EXPIRES_IN,
        }
    }

    #[must_use]
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Create and seal a token stamped with the current UTC time and the
    /// configured lifetime. A fresh token id is assigned.
    pub fn create_token(
        &self,
        credential: &str,
        scope: &str,
        token_type: &str,
        claims: Claims,
    ) -> Result<(String, Token), TokenError> {
        let draft = TokenDraft::new(credential, scope, token_type)
            .with_claims(claims)
            .with_ids(Uuid::now_v7().to_string(), String::new());

        self.create_token_at(Utc::now(), draft, self.expires_in)
    }

    /// Create and seal a token with an explicit creation time and lifetime.
    pub fn create_token_at(
        &self,
        now: DateTime<Utc>,
        draft: TokenDraft,
        expires_in: Duration,
    ) -> Result<(String, Token), TokenError> {
        let token = draft.stamp(now, expires_in);
        let sealed = self.encrypt_token(&token)?;
        Ok((sealed, token))
    }

    pub fn encrypt_token(&self, token: &Token) -> Result<String, TokenError> {
        self.formatter.encode(token).map_err(|e| {
            tracing::warn!(error = %e, token_type = %token.token_type, "token encoding failed");
            TokenError::Encoding(e.to_string())
        })
    }

    /// Open an opaque token string.
    ///
    /// Every formatter failure collapses into [`TokenError::MalformedToken`] so
    /// callers never learn whether the input was garbage or tampered with.
    pub fn decrypt_token(&self, sealed: &str) -> Result<Token, TokenError> {
        self.formatter.decode(sealed).map_err(|e| {
            tracing::debug!(error = %e, "token decryption failed");
            TokenError::MalformedToken
        })
    }
}

impl core::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ACCESS_TOKEN_TYPE, AesGcmFormatter, FormatterError};
    use std::sync::Arc;

    struct BrokenFormatter;

    impl SecureFormatter for BrokenFormatter {
        fn encode(&self, _token: &Token) -> Result<String, FormatterError> {
            Err(FormatterError::Encrypt)
        }

        fn decode(&self, _sealed: &str) -> Result<Token, FormatterError> {
            Err(FormatterError::Integrity)
        }
    }

    fn provider() -> TokenProvider {
        TokenProvider::new(AesGcmFormatter::new("provider-secret"))
    }

    #[test]
    fn create_token_stamps_clock_and_lifetime() {
        let provider = provider().with_expires_in(Duration::from_secs(120));
        let before = Utc::now();

        let (sealed, token) = provider
            .create_token("user01", "read", ACCESS_TOKEN_TYPE, Claims::new())
            .unwrap();

        assert!(token.creation_date >= before && token.creation_date <= Utc::now());
        assert_eq!(token.expires_in, Duration::from_secs(120));
        assert_eq!(token.credential, "user01");
        assert!(!token.token_id.is_empty());
        assert_eq!(provider.decrypt_token(&sealed).unwrap(), token);
    }

    #[test]
    fn default_lifetime_is_one_hour() {
        assert_eq!(provider().expires_in(), Duration::from_secs(3600));
    }

    #[test]
    fn decrypt_does_not_check_expiry() {
        let provider = provider();
        let long_ago = Utc::now() - chrono::Duration::days(30);
        let (sealed, _) = provider
            .create_token_at(
                long_ago,
                TokenDraft::new("user01", "", ACCESS_TOKEN_TYPE),
                Duration::from_secs(1),
            )
            .unwrap();

        let token = provider.decrypt_token(&sealed).unwrap();
        assert!(token.is_expired_at(Utc::now()));
    }

    #[test]
    fn formatter_failures_map_to_token_errors() {
        let provider = TokenProvider::new(BrokenFormatter);

        let err = provider
            .create_token("user01", "", ACCESS_TOKEN_TYPE, Claims::new())
            .unwrap_err();
        assert_eq!(err, TokenError::Encoding("encryption failed".to_string()));

        assert_eq!(provider.decrypt_token("anything"), Err(TokenError::MalformedToken));
    }

    #[test]
    fn garbage_and_tampering_are_indistinguishable() {
        let provider = provider();
        let (sealed, _) = provider
            .create_token("user01", "", ACCESS_TOKEN_TYPE, Claims::new())
            .unwrap();
        let mut tampered = sealed.into_bytes();
        let mid = tampered.len() / 2;
        tampered[mid] = if tampered[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert_eq!(provider.decrypt_token("garbage"), Err(TokenError::MalformedToken));
        assert_eq!(provider.decrypt_token(&tampered), Err(TokenError::MalformedToken));
    }

    #[test]
    fn concurrent_decrypts_match_sequential_results() {
        let provider = Arc::new(provider());

        let mut inputs = Vec::with_capacity(10_000);
        for i in 0..10_000 {
            if i % 2 == 0 {
                let (sealed, _) = provider
                    .create_token(&format!("user{i}"), "", ACCESS_TOKEN_TYPE, Claims::new())
                    .unwrap();
                inputs.push(sealed);
            } else {
                inputs.push(format!("invalid-token-{i}"));
            }
        }

        let sequential: Vec<Result<Token, TokenError>> =
            inputs.iter().map(|s| provider.decrypt_token(s)).collect();

        let threads = 16;
        let chunk = inputs.len().div_ceil(threads);
        let concurrent: Vec<Result<Token, TokenError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .chunks(chunk)
                .map(|part| {
                    let provider = Arc::clone(&provider);
                    scope.spawn(move || {
                        part.iter()
                            .map(|s| provider.decrypt_token(s))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(concurrent, sequential);
        assert_eq!(concurrent.iter().filter(|r| r.is_ok()).count(), 5_000);
        for (i, result) in concurrent.iter().enumerate() {
            if let Ok(token) = result {
                assert_eq!(token.credential, format!("user{i}"));
            }
        }
    }
}
