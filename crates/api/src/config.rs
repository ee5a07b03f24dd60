//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const SECRET_VAR: &str = "TOKENGATE_SECRET";
pub const BIND_VAR: &str = "TOKENGATE_BIND";
pub const TOKEN_TTL_VAR: &str = "TOKENGATE_TOKEN_TTL_SECS";
pub const CHECK_REVOCATION_VAR: &str = "TOKENGATE_CHECK_REVOCATION";
pub const ADMIN_USER_VAR: &str = "TOKENGATE_ADMIN_USER";
pub const ADMIN_PASSWORD_VAR: &str = "TOKENGATE_ADMIN_PASSWORD";

const DEV_SECRET: &str = "dev-secret";
const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// Username/password pair guarding the admin routes.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct GateConfig {
    /// Secret the token formatter is keyed with.
    pub secret: String,
    pub bind_addr: SocketAddr,
    pub token_ttl: Duration,
    /// Ask the verifier to veto revoked token ids on every request.
    pub check_revocation: bool,
    /// Admin routes are only mounted when this is set.
    pub admin: Option<AdminCredentials>,
}

impl core::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GateConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("check_revocation", &self.check_revocation)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl GateConfig {
    /// Defaults for everything except the secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            check_revocation: false,
            admin: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = match lookup(SECRET_VAR).filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("{SECRET_VAR} not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
        };

        let bind = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: BIND_VAR,
            value: bind.clone(),
            reason: e.to_string(),
        })?;

        let token_ttl = match lookup(TOKEN_TTL_VAR) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: TOKEN_TTL_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: TOKEN_TTL_VAR,
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
        };

        let check_revocation = match lookup(CHECK_REVOCATION_VAR) {
            Some(raw) => raw.parse::<bool>().map_err(|e| ConfigError::Invalid {
                key: CHECK_REVOCATION_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => false,
        };

        let admin = match (lookup(ADMIN_USER_VAR), lookup(ADMIN_PASSWORD_VAR)) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(ADMIN_USER_VAR, ADMIN_PASSWORD_VAR)),
        };

        Ok(Self {
            secret,
            bind_addr,
            token_ttl,
            check_revocation,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = GateConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.secret, DEV_SECRET);
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert!(!config.check_revocation);
        assert!(config.admin.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = GateConfig::from_lookup(lookup(&[
            (SECRET_VAR, "s3cret"),
            (BIND_VAR, "127.0.0.1:9000"),
            (TOKEN_TTL_VAR, "60"),
            (CHECK_REVOCATION_VAR, "true"),
            (ADMIN_USER_VAR, "admin"),
            (ADMIN_PASSWORD_VAR, "hunter2"),
        ]))
        .unwrap();

        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.token_ttl, Duration::from_secs(60));
        assert!(config.check_revocation);
        assert_eq!(
            config.admin,
            Some(AdminCredentials {
                username: "admin".to_string(),
                password: "hunter2".to_string(),
            })
        );
    }

    #[test]
    fn rejects_malformed_values() {
        for pairs in [
            vec![(BIND_VAR, "not-an-addr")],
            vec![(TOKEN_TTL_VAR, "soon")],
            vec![(TOKEN_TTL_VAR, "0")],
            vec![(CHECK_REVOCATION_VAR, "yes")],
        ] {
            let err = GateConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{pairs:?}");
        }
    }

    #[test]
    fn admin_pair_must_be_complete() {
        let err = GateConfig::from_lookup(lookup(&[(ADMIN_USER_VAR, "admin")])).unwrap_err();
        assert_eq!(err, ConfigError::Incomplete(ADMIN_USER_VAR, ADMIN_PASSWORD_VAR));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let mut config = GateConfig::new("top-secret");
        config.admin = Some(AdminCredentials {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        });

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
