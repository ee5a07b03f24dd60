use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tokengate_auth::{Rejection, TokenError, VerifierError};

/// Uniform 401 for every gate rejection: `{"code": 401, "msg": "..."}`.
///
/// The code is the same for all reasons; only the message tells them apart.
pub fn rejection_response(rejection: Rejection) -> Response {
    let challenge = match rejection {
        Rejection::MissingOrInvalidHeader => r#"Bearer error="invalid_request""#,
        Rejection::InvalidToken | Rejection::TokenExpired | Rejection::TokenRevoked => {
            r#"Bearer error="invalid_token""#
        }
    };

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge))],
        axum::Json(json!({
            "code": StatusCode::UNAUTHORIZED.as_u16(),
            "msg": format!("Not authorized: {rejection}"),
        })),
    )
        .into_response()
}

pub fn token_error_to_response(err: TokenError) -> Response {
    match err {
        TokenError::Verifier(
            VerifierError::InvalidUser | VerifierError::InvalidClient | VerifierError::InvalidCode,
        ) => json_error(StatusCode::UNAUTHORIZED, "invalid_grant", err.to_string()),
        TokenError::Verifier(VerifierError::TokenIdRejected(_)) => {
            json_error(StatusCode::FORBIDDEN, "token_rejected", err.to_string())
        }
        TokenError::Verifier(VerifierError::Backend(_)) => {
            json_error(StatusCode::BAD_GATEWAY, "verifier_error", err.to_string())
        }
        TokenError::Encoding(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "encoding_error", err.to_string())
        }
        TokenError::MissingCredential => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", err.to_string())
        }
        TokenError::MalformedToken => {
            json_error(StatusCode::BAD_REQUEST, "malformed_token", err.to_string())
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_share_status_and_code() {
        for rejection in [
            Rejection::MissingOrInvalidHeader,
            Rejection::InvalidToken,
            Rejection::TokenExpired,
            Rejection::TokenRevoked,
        ] {
            let res = rejection_response(rejection);
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
        }
    }

    #[test]
    fn verifier_failures_map_to_statuses() {
        let res = token_error_to_response(TokenError::Verifier(VerifierError::InvalidUser));
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = token_error_to_response(TokenError::Verifier(VerifierError::Backend(
            "down".to_string(),
        )));
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

        let res = token_error_to_response(TokenError::Encoding("boom".to_string()));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = token_error_to_response(TokenError::MissingCredential);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
