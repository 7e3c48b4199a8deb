//! Guard settings as they appear in configuration sources.

use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, ConfigManager, Result};
use bulwark_csrf::{
    CsrfGuard, DEFAULT_ALGORITHM, DEFAULT_COOKIE_KEY, DEFAULT_PROTECTED_METHODS, ExclusionRule,
    HmacVerifier, ProtectionConfig, SigningKey,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Deserializable guard settings.
///
/// Field names are snake_case; the camelCase spellings (`methodsToProtect`,
/// `excludedUrls`, `cookieKey`, `encryptAlgorithm`, `encryptSecret`) are
/// accepted as aliases. Missing fields take their defaults.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfSettings {
    #[serde(alias = "methodsToProtect")]
    pub methods_to_protect: Vec<String>,

    #[serde(alias = "excludedUrls")]
    pub excluded_urls: Vec<ExclusionRule>,

    #[serde(alias = "cookieKey")]
    pub cookie_key: String,

    #[serde(alias = "encryptAlgorithm")]
    pub encrypt_algorithm: String,

    /// Base64 key material for the bundled HMAC verifier.
    #[serde(alias = "encryptSecret", skip_serializing_if = "Option::is_none")]
    pub encrypt_secret: Option<String>,
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            methods_to_protect: DEFAULT_PROTECTED_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            excluded_urls: Vec::new(),
            cookie_key: DEFAULT_COOKIE_KEY.to_string(),
            encrypt_algorithm: DEFAULT_ALGORITHM.to_string(),
            encrypt_secret: None,
        }
    }
}

impl fmt::Debug for CsrfSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfSettings")
            .field("methods_to_protect", &self.methods_to_protect)
            .field("excluded_urls", &self.excluded_urls)
            .field("cookie_key", &self.cookie_key)
            .field("encrypt_algorithm", &self.encrypt_algorithm)
            .field(
                "encrypt_secret",
                &self.encrypt_secret.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

impl CsrfSettings {
    /// Defaults overridden by `CSURF_*` variables, after reading `.env` if
    /// one exists.
    pub fn from_env() -> Result<Self> {
        let mut manager = ConfigManager::new();
        manager.load_dotenv(None)?;
        manager.load_validated()
    }

    /// Defaults overridden by a JSON or TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut manager = ConfigManager::new();
        manager.load_file(path)?;
        manager.load_validated()
    }

    /// Compile into a [`ProtectionConfig`].
    pub fn to_protection_config(&self) -> Result<ProtectionConfig> {
        let config = ProtectionConfig::builder()
            .with_protected_methods(self.methods_to_protect.iter().cloned())
            .with_exclusions(self.excluded_urls.iter().cloned())
            .with_cookie_key(self.cookie_key.as_str())
            .with_algorithm(self.encrypt_algorithm.as_str())
            .build()?;
        Ok(config)
    }

    /// Decode `encrypt_secret`.
    pub fn signing_key(&self) -> Result<SigningKey> {
        let encoded = self
            .encrypt_secret
            .as_deref()
            .ok_or_else(|| ConfigError::KeyNotFound("encrypt_secret".to_string()))?;
        Ok(SigningKey::from_base64(encoded.trim())?)
    }

    /// Build a guard backed by the bundled HMAC verifier and a static key.
    pub fn into_guard(self) -> Result<CsrfGuard> {
        if !HmacVerifier::supports(&self.encrypt_algorithm) {
            return Err(ConfigError::ValidationError(format!(
                "encrypt_algorithm {} is not supported by the HMAC verifier",
                self.encrypt_algorithm
            )));
        }
        let key = self.signing_key()?;
        Ok(CsrfGuard::hmac(self.to_protection_config()?, key))
    }
}

impl Validate for CsrfSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.cookie_key, "cookie_key")?;
        ConfigValidator::not_empty(&self.encrypt_algorithm, "encrypt_algorithm")?;
        ConfigValidator::no_empty_entries(
            self.methods_to_protect.as_slice(),
            "methods_to_protect",
        )?;
        if self.encrypt_secret.is_some() {
            self.signing_key()?;
        }
        Ok(())
    }
}
