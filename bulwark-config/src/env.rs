// Environment variable loading

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::env;

/// Prefix used when none is given.
pub const DEFAULT_ENV_PREFIX: &str = "CSURF";

/// Environment variable loader
///
/// Reads `<PREFIX>_METHODS_TO_PROTECT` (comma separated),
/// `<PREFIX>_EXCLUDED_URLS` (JSON array), `<PREFIX>_COOKIE_KEY`,
/// `<PREFIX>_ENCRYPT_ALGORITHM` and `<PREFIX>_ENCRYPT_SECRET`. Other
/// variables carrying the prefix are ignored.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Collect settings from the process environment.
    pub fn load(&self) -> Result<Map<String, Value>> {
        self.load_from(env::vars())
    }

    /// Collect settings from an explicit set of variables.
    pub fn load_from<I, K, V>(&self, vars: I) -> Result<Map<String, Value>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let marker = format!("{}_", self.prefix);
        let mut settings = Map::new();

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(&marker) else {
                continue;
            };
            let name = name.to_lowercase();
            let value = value.into();

            let parsed = match name.as_str() {
                "methods_to_protect" => Value::Array(split_list(&value)),
                "excluded_urls" => serde_json::from_str(&value).map_err(|e| {
                    ConfigError::ParseError(format!("{}: {}", key.as_ref(), e))
                })?,
                "cookie_key" | "encrypt_algorithm" | "encrypt_secret" => Value::String(value),
                _ => {
                    tracing::trace!(variable = key.as_ref(), "Ignoring unknown variable");
                    continue;
                }
            };
            settings.insert(name, parsed);
        }

        Ok(settings)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

// An empty value yields an empty list, which disables protection.
fn split_list(value: &str) -> Vec<Value> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| Value::String(item.to_string()))
        .collect()
}
