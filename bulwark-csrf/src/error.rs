use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unsupported flag '{flag}' on exclusion pattern '{pattern}'")]
    UnsupportedFlag { pattern: String, flag: char },

    #[error("Invalid exclusion rule: {0}")]
    InvalidRule(String),

    #[error("Cookie key must not be empty")]
    MissingCookieKey,

    #[error("Invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    #[error("Secret key provider failed: {0}")]
    KeyProvider(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("Token verification failed: {0}")]
    Verification(String),
}

impl CsrfError {
    /// Whether this error comes from configuration rather than request handling.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CsrfError::InvalidPattern { .. }
                | CsrfError::UnsupportedFlag { .. }
                | CsrfError::InvalidRule(_)
                | CsrfError::MissingCookieKey
                | CsrfError::InvalidMethod(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;
