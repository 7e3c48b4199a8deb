use crate::config::ProtectionConfig;
use crate::error::{CsrfError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use std::sync::Arc;

/// Minimum signing key length in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Key material used by the token verifier.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Arc<[u8]>);

impl SigningKey {
    /// Wrap raw key bytes. The key must be at least [`MIN_KEY_LEN`] bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < MIN_KEY_LEN {
            return Err(CsrfError::InvalidKey(format!(
                "key must be at least {} bytes, got {}",
                MIN_KEY_LEN,
                bytes.len()
            )));
        }
        Ok(Self(bytes.into()))
    }

    /// Decode a standard base64 key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        Self::new(STANDARD.decode(encoded.trim())?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&"***").finish()
    }
}

/// Source of the current signing key.
///
/// Implementations may fetch the key from a key-management service. A
/// failure here is an infrastructure error, not a token rejection.
#[async_trait]
pub trait SecretKeyProvider: Send + Sync {
    async fn signing_key(&self, config: &ProtectionConfig) -> Result<SigningKey>;
}

/// Provider returning one key fixed at startup.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: SigningKey,
}

impl StaticKeyProvider {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        SigningKey::from_base64(encoded).map(Self::new)
    }
}

#[async_trait]
impl SecretKeyProvider for StaticKeyProvider {
    async fn signing_key(&self, _config: &ProtectionConfig) -> Result<SigningKey> {
        Ok(self.key.clone())
    }
}
