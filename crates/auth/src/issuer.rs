//! Token issuance: Verifier hooks around [`TokenProvider::create_token_at`].
//!
//! Grant endpoints call into this after deciding *who* is asking; the issuer
//! decides *what* they get. Hook errors are propagated untouched and no
//! compensation is attempted.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{ACCESS_TOKEN_TYPE, Properties, Token, TokenDraft, TokenError, TokenProvider, Verifier};

/// What a grant endpoint hands back to its client.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always "Bearer".
    pub token_type: String,

    /// Lifetime in whole seconds.
    pub expires_in: u64,

    pub scope: String,

    /// Verifier-supplied metadata (not sealed into the token). Nested so a
    /// property can never shadow one of the fields above.
    pub properties: Properties,

    #[serde(skip)]
    pub token: Token,
}

pub struct TokenIssuer<V: ?Sized> {
    provider: Arc<TokenProvider>,
    verifier: Arc<V>,
}

impl<V: ?Sized> Clone for TokenIssuer<V> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            verifier: Arc::clone(&self.verifier),
        }
    }
}

impl<V> TokenIssuer<V>
where
    V: Verifier + ?Sized,
{
    pub fn new(provider: Arc<TokenProvider>, verifier: Arc<V>) -> Self {
        Self { provider, verifier }
    }

    pub fn provider(&self) -> &Arc<TokenProvider> {
        &self.provider
    }

    pub fn verifier(&self) -> &Arc<V> {
        &self.verifier
    }

    /// Validate user credentials, then issue an access token for the user.
    pub async fn issue_for_user(
        &self,
        username: &str,
        password: &str,
        scope: &str,
    ) -> Result<TokenResponse, TokenError> {
        self.verifier.validate_user(username, password, scope).await?;
        self.issue(username, scope).await
    }

    /// Validate client credentials, then issue an access token for the client.
    pub async fn issue_for_client(
        &self,
        client_id: &str,
        client_secret: &str,
        scope: &str,
    ) -> Result<TokenResponse, TokenError> {
        self.verifier
            .validate_client(client_id, client_secret, scope)
            .await?;
        self.issue(client_id, scope).await
    }

    /// Issue an access token for an already-authenticated credential.
    ///
    /// An empty credential is refused before any verifier hook runs.
    pub async fn issue(&self, credential: &str, scope: &str) -> Result<TokenResponse, TokenError> {
        if credential.is_empty() {
            return Err(TokenError::MissingCredential);
        }

        let token_id = Uuid::now_v7().to_string();
        let refresh_token_id = Uuid::now_v7().to_string();

        let claims = self
            .verifier
            .add_claims(credential, &token_id, ACCESS_TOKEN_TYPE, scope)
            .await?;

        let draft = TokenDraft::new(credential, scope, ACCESS_TOKEN_TYPE)
            .with_claims(claims)
            .with_ids(token_id.clone(), refresh_token_id.clone());
        let expires_in = self.provider.expires_in();
        let (access_token, token) = self.provider.create_token_at(Utc::now(), draft, expires_in)?;

        self.verifier
            .store_token_id(credential, &token_id, &refresh_token_id, ACCESS_TOKEN_TYPE)
            .await?;

        let properties = self
            .verifier
            .add_properties(credential, &token_id, ACCESS_TOKEN_TYPE, scope)
            .await?;

        tracing::debug!(credential, token_id = %token_id, "issued access token");

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: token.expires_in.as_secs(),
            scope: token.scope.clone(),
            properties,
            token,
        })
    }
}
