//! Application-supplied credential validation and token enrichment.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Claims, Properties};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error("invalid user credentials")]
    InvalidUser,

    #[error("invalid client credentials")]
    InvalidClient,

    #[error("invalid authorization code")]
    InvalidCode,

    #[error("token id rejected: {0}")]
    TokenIdRejected(String),

    #[error("verifier backend failure: {0}")]
    Backend(String),
}

/// Extension point through which an application validates credentials and
/// enriches tokens.
///
/// Only `validate_user` and `validate_client` are mandatory. The remaining
/// hooks default to an empty result or a no-op success.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn validate_user(
        &self,
        username: &str,
        password: &str,
        scope: &str,
    ) -> Result<(), VerifierError>;

    async fn validate_client(
        &self,
        client_id: &str,
        client_secret: &str,
        scope: &str,
    ) -> Result<(), VerifierError>;

    /// Exchange an authorization code for a credential.
    async fn validate_code(
        &self,
        _client_id: &str,
        _client_secret: &str,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<String, VerifierError> {
        Err(VerifierError::InvalidCode)
    }

    /// Claims sealed into the token being created.
    async fn add_claims(
        &self,
        _credential: &str,
        _token_id: &str,
        _token_type: &str,
        _scope: &str,
    ) -> Result<Claims, VerifierError> {
        Ok(Claims::new())
    }

    /// Metadata returned next to the token, never sealed into it.
    async fn add_properties(
        &self,
        _credential: &str,
        _token_id: &str,
        _token_type: &str,
        _scope: &str,
    ) -> Result<Properties, VerifierError> {
        Ok(Properties::new())
    }

    async fn store_token_id(
        &self,
        _credential: &str,
        _token_id: &str,
        _refresh_token_id: &str,
        _token_type: &str,
    ) -> Result<(), VerifierError> {
        Ok(())
    }

    /// Veto an otherwise valid token (e.g. revocation lists).
    async fn validate_token_id(
        &self,
        _credential: &str,
        _token_id: &str,
        _refresh_token_id: &str,
        _token_type: &str,
    ) -> Result<(), VerifierError> {
        Ok(())
    }
}
