//! `tokengate-auth` — bearer token lifecycle and verification.
//!
//! This crate is intentionally decoupled from HTTP: it seals tokens, opens
//! them, and decides whether an `Authorization` header value is acceptable.

pub mod formatter;
pub mod gate;
pub mod issuer;
pub mod memory;
pub mod provider;
pub mod token;
pub mod verifier;

pub use formatter::{AesGcmFormatter, FormatterError, SecureFormatter};
pub use gate::{AuthorizedToken, Rejection, authorize, bearer_token};
pub use issuer::{TokenIssuer, TokenResponse};
pub use memory::{InMemoryVerifier, IssuedToken};
pub use provider::{DEFAULT_EXPIRES_IN, TokenError, TokenProvider};
pub use token::{ACCESS_TOKEN_TYPE, Claims, Properties, REFRESH_TOKEN_TYPE, Token, TokenDraft};
pub use verifier::{Verifier, VerifierError};
