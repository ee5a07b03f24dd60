use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{Claims, Properties, Verifier, VerifierError};

/// A token id recorded through [`Verifier::store_token_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub credential: String,
    pub refresh_token_id: String,
    pub token_type: String,
}

#[derive(Debug, Default)]
struct Registry {
    users: HashMap<String, String>,
    clients: HashMap<String, String>,
    claims: HashMap<String, Claims>,
    properties: HashMap<String, Properties>,
    issued: HashMap<String, IssuedToken>,
    revoked: HashSet<String>,
}

/// In-process verifier for tests/dev.
///
/// Holds registered users and clients, per-credential claims and properties,
/// every stored token id, and a revocation set consulted by
/// `validate_token_id`.
///
/// Stored ids and revocations are kept for the life of the process; nothing
/// prunes them once the tokens expire. Use [`InMemoryVerifier::forget`] to
/// drop an id explicitly.
#[derive(Debug, Default)]
pub struct InMemoryVerifier {
    inner: RwLock<Registry>,
}

impl InMemoryVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.register_user(username, password);
        self
    }

    #[must_use]
    pub fn with_client(self, client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.register_client(client_id, secret);
        self
    }

    #[must_use]
    pub fn with_claims(self, credential: impl Into<String>, claims: Claims) -> Self {
        if let Ok(mut reg) = self.inner.write() {
            reg.claims.insert(credential.into(), claims);
        }
        self
    }

    #[must_use]
    pub fn with_properties(self, credential: impl Into<String>, properties: Properties) -> Self {
        if let Ok(mut reg) = self.inner.write() {
            reg.properties.insert(credential.into(), properties);
        }
        self
    }

    pub fn register_user(&self, username: impl Into<String>, password: impl Into<String>) {
        if let Ok(mut reg) = self.inner.write() {
            reg.users.insert(username.into(), password.into());
        }
    }

    pub fn register_client(&self, client_id: impl Into<String>, secret: impl Into<String>) {
        if let Ok(mut reg) = self.inner.write() {
            reg.clients.insert(client_id.into(), secret.into());
        }
    }

    /// Revoke a token id (access or refresh). Returns `false` if it was
    /// already revoked.
    pub fn revoke(&self, token_id: impl Into<String>) -> bool {
        match self.inner.write() {
            Ok(mut reg) => reg.revoked.insert(token_id.into()),
            Err(_) => false,
        }
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.inner
            .read()
            .map(|reg| reg.revoked.contains(token_id))
            .unwrap_or(false)
    }

    /// Drop every record of `token_id`, stored or revoked. Returns whether
    /// anything was removed.
    pub fn forget(&self, token_id: &str) -> bool {
        match self.inner.write() {
            Ok(mut reg) => {
                let issued = reg.issued.remove(token_id).is_some();
                let revoked = reg.revoked.remove(token_id);
                issued || revoked
            }
            Err(_) => false,
        }
    }

    pub fn issued(&self, token_id: &str) -> Option<IssuedToken> {
        let reg = self.inner.read().ok()?;
        reg.issued.get(token_id).cloned()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Registry>, VerifierError> {
        self.inner
            .read()
            .map_err(|_| VerifierError::Backend("verifier registry lock poisoned".to_string()))
    }
}

#[async_trait]
impl Verifier for InMemoryVerifier {
    async fn validate_user(
        &self,
        username: &str,
        password: &str,
        _scope: &str,
    ) -> Result<(), VerifierError> {
        match self.read()?.users.get(username) {
            Some(expected) if expected == password => Ok(()),
            _ => Err(VerifierError::InvalidUser),
        }
    }

    async fn validate_client(
        &self,
        client_id: &str,
        client_secret: &str,
        _scope: &str,
    ) -> Result<(), VerifierError> {
        match self.read()?.clients.get(client_id) {
            Some(expected) if expected == client_secret => Ok(()),
            _ => Err(VerifierError::InvalidClient),
        }
    }

    async fn add_claims(
        &self,
        credential: &str,
        _token_id: &str,
        _token_type: &str,
        _scope: &str,
    ) -> Result<Claims, VerifierError> {
        Ok(self.read()?.claims.get(credential).cloned().unwrap_or_default())
    }

    async fn add_properties(
        &self,
        credential: &str,
        _token_id: &str,
        _token_type: &str,
        _scope: &str,
    ) -> Result<Properties, VerifierError> {
        Ok(self
            .read()?
            .properties
            .get(credential)
            .cloned()
            .unwrap_or_default())
    }

    async fn store_token_id(
        &self,
        credential: &str,
        token_id: &str,
        refresh_token_id: &str,
        token_type: &str,
    ) -> Result<(), VerifierError> {
        let mut reg = self
            .inner
            .write()
            .map_err(|_| VerifierError::Backend("verifier registry lock poisoned".to_string()))?;
        reg.issued.insert(
            token_id.to_string(),
            IssuedToken {
                credential: credential.to_string(),
                refresh_token_id: refresh_token_id.to_string(),
                token_type: token_type.to_string(),
            },
        );
        Ok(())
    }

    async fn validate_token_id(
        &self,
        _credential: &str,
        token_id: &str,
        refresh_token_id: &str,
        _token_type: &str,
    ) -> Result<(), VerifierError> {
        let reg = self.read()?;
        if reg.revoked.contains(token_id) {
            return Err(VerifierError::TokenIdRejected(token_id.to_string()));
        }
        if !refresh_token_id.is_empty() && reg.revoked.contains(refresh_token_id) {
            return Err(VerifierError::TokenIdRejected(refresh_token_id.to_string()));
        }
        Ok(())
    }
}
