//! Configuration loading for the Bulwark CSRF guard.
//!
//! Settings are layered: defaults, then files, then environment variables,
//! each source overriding the keys it sets.
//!
//! ```rust,no_run
//! use bulwark_config::{ConfigManager, CsrfSettings};
//!
//! let mut manager = ConfigManager::new();
//! manager.load_file("csrf.toml")?;
//! manager.load_env()?;
//!
//! let settings: CsrfSettings = manager.load_validated()?;
//! let guard = settings.into_guard()?;
//! # Ok::<(), bulwark_config::ConfigError>(())
//! ```
//!
//! A file may hold the settings at its root or under a `csurf` table.

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use env::{DEFAULT_ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::CsrfSettings;
pub use validation::{ConfigValidator, Validate};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Table name under which a file may nest the settings.
pub const SETTINGS_SECTION: &str = "csurf";

/// Main configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    values: Map<String, Value>,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager reading `CSURF_*` variables
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            values: Map::new(),
            env_prefix: prefix.into(),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&mut self) -> Result<()> {
        let vars = EnvLoader::new(self.env_prefix.as_str()).load()?;
        debug!(prefix = %self.env_prefix, keys = vars.len(), "Loaded environment configuration");
        self.merge(vars);
        Ok(())
    }

    /// Load configuration from an explicit set of variables
    pub fn load_env_from<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let vars = EnvLoader::new(self.env_prefix.as_str()).load_from(vars)?;
        self.merge(vars);
        Ok(())
    }

    /// Load configuration from .env file, then from the environment
    pub fn load_dotenv(&mut self, path: Option<&Path>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Read .env file");
        }
        self.load_env()
    }

    /// Load configuration from a file, detecting the format by extension
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        self.load_file_with(path, loader.format())
    }

    /// Load configuration from a file in the given format
    pub fn load_file_with(&mut self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let path = path.as_ref();
        let data = ConfigLoader::new(format).load_file(path)?;
        let section = settings_section(data)?;
        debug!(path = %path.display(), keys = section.len(), "Loaded configuration file");
        self.merge(section);
        Ok(())
    }

    /// Set a configuration value
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .values
            .get(&normalize_key(key))
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    /// Get all configuration keys
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Load and validate configuration
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let validated: T = serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }

    fn merge(&mut self, values: Map<String, Value>) {
        for (key, value) in values {
            self.values.insert(normalize_key(&key), value);
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn settings_section(data: Value) -> Result<Map<String, Value>> {
    let Value::Object(mut root) = data else {
        return Err(ConfigError::ParseError(
            "configuration root must be an object".to_string(),
        ));
    };

    match root.remove(SETTINGS_SECTION) {
        Some(Value::Object(section)) => Ok(section),
        Some(_) => Err(ConfigError::ParseError(format!(
            "{} must be a table",
            SETTINGS_SECTION
        ))),
        None => Ok(root),
    }
}

// `cookieKey`, `cookie-key` and `cookie_key` all name the same setting.
fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '-' {
            out.push('_');
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}
