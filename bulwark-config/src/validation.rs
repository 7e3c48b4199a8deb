// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that no entry of a list is empty
    pub fn no_empty_entries<S: AsRef<str>>(values: &[S], field: &str) -> Result<()> {
        if values.iter().any(|v| v.as_ref().trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot contain empty entries",
                field
            )));
        }
        Ok(())
    }
}
