use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use tokengate_auth::{Rejection, TokenProvider, Verifier, authorize};

use crate::context::AuthContext;
use crate::errors::rejection_response;

#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<TokenProvider>,

    /// When set, `validate_token_id` runs after the expiry check and can veto
    /// the request.
    pub revocation: Option<Arc<dyn Verifier>>,
}

impl AuthState {
    pub fn new(provider: Arc<TokenProvider>) -> Self {
        Self {
            provider,
            revocation: None,
        }
    }

    #[must_use]
    pub fn with_revocation(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.revocation = Some(verifier);
        self
    }
}

/// Bearer gate: authorize the request or answer 401 and stop the chain.
///
/// On success the [`AuthContext`] is available to every downstream handler
/// as a request extension.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| reject(Rejection::MissingOrInvalidHeader))?),
        None => None,
    };

    let authorized = authorize(&state.provider, header, Utc::now()).map_err(reject)?;

    if let Some(verifier) = &state.revocation {
        let token = &authorized.token;
        verifier
            .validate_token_id(
                &token.credential,
                &token.token_id,
                &token.refresh_token_id,
                &token.token_type,
            )
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, token_id = %token.token_id, "token vetoed by verifier");
                reject(Rejection::TokenRevoked)
            })?;
    }

    req.extensions_mut().insert(AuthContext::from(authorized));

    Ok(next.run(req).await)
}

fn reject(rejection: Rejection) -> Response {
    tracing::debug!(reason = %rejection, "request rejected at bearer gate");
    rejection_response(rejection)
}
