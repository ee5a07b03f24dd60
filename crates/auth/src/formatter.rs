//! Sealing of tokens into opaque bearer strings.
//!
//! A [`SecureFormatter`] owns the secret and provides both confidentiality and
//! tamper evidence: any change to a sealed string must make `decode` fail.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::Token;

/// Nonce size for AES-256-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Authentication tag appended by AES-GCM (128 bits).
const TAG_SIZE: usize = 16;

/// Associated data binding ciphertexts to this sealing format.
const FORMAT_LABEL: &[u8] = b"tokengate.v1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatterError {
    #[error("failed to serialize token: {0}")]
    Serialize(String),

    #[error("encryption failed")]
    Encrypt,

    #[error("token is not valid base64")]
    Encoding,

    #[error("token is too short")]
    Truncated,

    #[error("token failed integrity verification")]
    Integrity,

    #[error("token payload is malformed: {0}")]
    Payload(String),
}

/// Pluggable codec turning a [`Token`] into an opaque string and back.
///
/// Implementations must be immutable after construction: the same instance is
/// shared across every in-flight request.
pub trait SecureFormatter: Send + Sync {
    fn encode(&self, token: &Token) -> Result<String, FormatterError>;

    fn decode(&self, sealed: &str) -> Result<Token, FormatterError>;
}

/// AES-256-GCM formatter keyed by the SHA-256 digest of a shared secret.
///
/// Sealed form: URL-safe unpadded base64 of `nonce || ciphertext || tag`.
/// Every instance built from the same secret opens tokens sealed by any other.
#[derive(Clone)]
pub struct AesGcmFormatter {
    cipher: Aes256Gcm,
}

impl AesGcmFormatter {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let key = Sha256::digest(secret.as_ref());
        Self {
            cipher: Aes256Gcm::new(&key),
        }
    }
}

impl core::fmt::Debug for AesGcmFormatter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AesGcmFormatter").finish_non_exhaustive()
    }
}

impl SecureFormatter for AesGcmFormatter {
    fn encode(&self, token: &Token) -> Result<String, FormatterError> {
        let plaintext =
            serde_json::to_vec(token).map_err(|e| FormatterError::Serialize(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: &plaintext,
                    aad: FORMAT_LABEL,
                },
            )
            .map_err(|_| FormatterError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    fn decode(&self, sealed: &str) -> Result<Token, FormatterError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|_| FormatterError::Encoding)?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(FormatterError::Truncated);
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: FORMAT_LABEL,
                },
            )
            .map_err(|_| FormatterError::Integrity)?;

        serde_json::from_slice(&plaintext).map_err(|e| FormatterError::Payload(e.to_string()))
    }
}
