//! HTTP application wiring (Axum router + shared state).

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use tower::ServiceBuilder;

use tokengate_auth::{AesGcmFormatter, InMemoryVerifier, TokenIssuer, TokenProvider, Verifier};

use crate::basic::basic_auth_middleware;
use crate::config::GateConfig;
use crate::context::AuthContext;
use crate::errors::token_error_to_response;
use crate::middleware::{AuthState, auth_middleware};

#[derive(Clone)]
struct AdminState {
    issuer: TokenIssuer<InMemoryVerifier>,
}

#[derive(Debug, Deserialize)]
struct IssueTokenRequest {
    credential: String,
    #[serde(default)]
    scope: String,
}

/// Build the full HTTP router from configuration.
pub fn build_app(config: &GateConfig) -> Router {
    let provider = Arc::new(
        TokenProvider::new(AesGcmFormatter::new(config.secret.as_bytes()))
            .with_expires_in(config.token_ttl),
    );
    build_app_with(config, provider, Arc::new(InMemoryVerifier::new()))
}

/// Build the router around an existing provider and verifier.
pub fn build_app_with(
    config: &GateConfig,
    provider: Arc<TokenProvider>,
    verifier: Arc<InMemoryVerifier>,
) -> Router {
    let mut auth_state = AuthState::new(Arc::clone(&provider));
    if config.check_revocation {
        let revocation: Arc<dyn Verifier> = verifier.clone();
        auth_state = auth_state.with_revocation(revocation);
    }

    // Protected routes: require a valid bearer token. `route_layer` keeps
    // unmatched paths out of the gate so they still answer 404.
    let protected = Router::new()
        .route("/whoami", get(whoami))
        .route_layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware));

    let mut app = Router::new()
        .route("/health", get(health))
        .merge(protected);

    match &config.admin {
        Some(admin) => {
            let admin_state = AdminState {
                issuer: TokenIssuer::new(provider, verifier),
            };
            let admin_routes = Router::new()
                .route("/admin/tokens", post(issue_token))
                .route("/admin/tokens/:token_id", delete(revoke_token))
                .with_state(admin_state)
                .route_layer(axum::middleware::from_fn_with_state(
                    admin.clone(),
                    basic_auth_middleware,
                ));
            app = app.merge(admin_routes);
        }
        None => tracing::info!("admin credentials not configured; admin routes disabled"),
    }

    app.layer(ServiceBuilder::new())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn whoami(Extension(auth): Extension<AuthContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "credential": auth.credential(),
        "claims": auth.claims(),
        "scope": auth.scope(),
        "token_type": auth.token_type(),
        "access_token": auth.access_token(),
    }))
}

async fn issue_token(
    State(state): State<AdminState>,
    Json(body): Json<IssueTokenRequest>,
) -> Response {
    match state.issuer.issue(&body.credential, &body.scope).await {
        Ok(res) => (StatusCode::CREATED, Json(res)).into_response(),
        Err(e) => token_error_to_response(e),
    }
}

async fn revoke_token(State(state): State<AdminState>, Path(token_id): Path<String>) -> StatusCode {
    if state.issuer.verifier().revoke(token_id.as_str()) {
        tracing::info!(token_id = %token_id, "token revoked");
    }
    StatusCode::NO_CONTENT
}
