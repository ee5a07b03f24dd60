use tokengate_auth::{AuthorizedToken, Claims};

/// Authenticated identity for a request (inserted by the bearer gate).
///
/// This is immutable and present on every route behind the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    credential: String,
    claims: Claims,
    scope: String,
    token_type: String,
    access_token: String,
}

impl AuthContext {
    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// The raw bearer string the client presented.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl From<AuthorizedToken> for AuthContext {
    fn from(value: AuthorizedToken) -> Self {
        let AuthorizedToken {
            token,
            access_token,
        } = value;

        Self {
            credential: token.credential,
            claims: token.claims,
            scope: token.scope,
            token_type: token.token_type,
            access_token,
        }
    }
}
