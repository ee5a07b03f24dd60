//! Per-request bearer authorization.
//!
//! A single linear pass over one `Authorization` header value:
//! header extraction, decryption, expiry check. The first failing step decides
//! the [`Rejection`]; nothing is retried and nothing is persisted.
//!
//! - No IO
//! - No panics
//! - The caller supplies "now"

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Token, TokenProvider};

/// Scheme expected in front of the token, compared ASCII case-insensitively.
pub const BEARER_SCHEME: &str = "bearer";

/// Why a request was turned away at the gate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Invalid bearer authorization header")]
    MissingOrInvalidHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Only produced when a verifier-backed revocation check is enabled.
    #[error("Token revoked")]
    TokenRevoked,
}

/// A token that passed the gate, together with the raw string presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedToken {
    pub token: Token,
    pub access_token: String,
}

/// Extract the token from an `Authorization` header value.
///
/// Requires the `bearer` scheme (any ASCII case) followed by exactly one
/// space. Whatever follows, including nothing, is returned untouched.
pub fn bearer_token(header: Option<&str>) -> Result<&str, Rejection> {
    let header = header.ok_or(Rejection::MissingOrInvalidHeader)?;

    let scheme = header
        .get(..BEARER_SCHEME.len())
        .ok_or(Rejection::MissingOrInvalidHeader)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(Rejection::MissingOrInvalidHeader);
    }

    header[BEARER_SCHEME.len()..]
        .strip_prefix(' ')
        .ok_or(Rejection::MissingOrInvalidHeader)
}

/// Run the full gate for one request.
pub fn authorize(
    provider: &TokenProvider,
    header: Option<&str>,
    now: DateTime<Utc>,
) -> Result<AuthorizedToken, Rejection> {
    let access_token = bearer_token(header)?;

    let token = provider
        .decrypt_token(access_token)
        .map_err(|_| Rejection::InvalidToken)?;

    if token.is_expired_at(now) {
        return Err(Rejection::TokenExpired);
    }

    Ok(AuthorizedToken {
        token,
        access_token: access_token.to_string(),
    })
}
