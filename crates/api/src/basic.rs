//! HTTP Basic credential check for the admin routes.
//!
//! Independent of the bearer gate: a plain equality comparison against one
//! configured username/password pair.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

use crate::config::AdminCredentials;
use crate::errors::json_error;

const BASIC_PREFIX: &str = "basic ";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BasicAuthError {
    #[error("basic credentials are not valid base64")]
    Encoding,

    #[error("missing basic credentials")]
    Missing,

    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Decode `Basic <base64(username:password)>`.
///
/// Returns `Ok(None)` when the header is absent, uses another scheme, or the
/// decoded value has no `username:` part.
pub fn basic_credentials(header: Option<&str>) -> Result<Option<(String, String)>, BasicAuthError> {
    let Some(header) = header else {
        return Ok(None);
    };
    let Some(prefix) = header.get(..BASIC_PREFIX.len()) else {
        return Ok(None);
    };
    if !prefix.eq_ignore_ascii_case(BASIC_PREFIX) {
        return Ok(None);
    }

    let decoded = STANDARD
        .decode(&header[BASIC_PREFIX.len()..])
        .map_err(|_| BasicAuthError::Encoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| BasicAuthError::Encoding)?;

    match decoded.split_once(':') {
        Some((username, password)) if !username.is_empty() => {
            Ok(Some((username.to_string(), password.to_string())))
        }
        _ => Ok(None),
    }
}

/// Accept only when both username and password match.
pub fn check_basic(
    expected: &AdminCredentials,
    header: Option<&str>,
) -> Result<(), BasicAuthError> {
    let (username, password) = basic_credentials(header)?.ok_or(BasicAuthError::Missing)?;

    if username != expected.username || password != expected.password {
        return Err(BasicAuthError::InvalidCredentials);
    }
    Ok(())
}

pub async fn basic_auth_middleware(
    State(expected): State<AdminCredentials>,
    req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = check_basic(&expected, header) {
        tracing::debug!(error = %e, "admin request rejected");
        let mut res = json_error(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string());
        res.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(r#"Basic realm="tokengate""#),
        );
        return res.into_response();
    }

    next.run(req).await
}
