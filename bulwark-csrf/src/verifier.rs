use crate::error::{CsrfError, Result};
use crate::provider::SigningKey;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm identifiers understood by [`HmacVerifier`].
pub const HMAC_SHA256_ALGORITHMS: &[&str] = &["HMAC-SHA256", "HS256"];

/// Token verification primitive.
///
/// Returns `Ok(false)` for a token that does not match the secret and `Err`
/// when verification could not be carried out at all. The guard rejects the
/// request in both cases.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(
        &self,
        secret: &str,
        token: &str,
        key: &SigningKey,
        algorithm: &str,
    ) -> Result<bool>;
}

/// HMAC-SHA256 double-submit verifier.
///
/// A valid token is the unpadded URL-safe base64 HMAC of the cookie secret
/// under the signing key.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacVerifier;

impl HmacVerifier {
    pub fn new() -> Self {
        Self
    }

    pub fn supports(algorithm: &str) -> bool {
        HMAC_SHA256_ALGORITHMS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(algorithm))
    }

    /// Compute the token matching a secret.
    pub fn sign(secret: &str, key: &SigningKey, algorithm: &str) -> Result<String> {
        let mut mac = Self::mac(key, algorithm)?;
        mac.update(secret.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    fn mac(key: &SigningKey, algorithm: &str) -> Result<HmacSha256> {
        if !Self::supports(algorithm) {
            return Err(CsrfError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| CsrfError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl TokenVerifier for HmacVerifier {
    async fn verify(
        &self,
        secret: &str,
        token: &str,
        key: &SigningKey,
        algorithm: &str,
    ) -> Result<bool> {
        let mut mac = Self::mac(key, algorithm)?;

        // A token that isn't even base64 simply doesn't match.
        let Ok(signature) = URL_SAFE_NO_PAD.decode(token) else {
            return Ok(false);
        };

        mac.update(secret.as_bytes());
        Ok(mac.verify_slice(&signature).is_ok())
    }
}
