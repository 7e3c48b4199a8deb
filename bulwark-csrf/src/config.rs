use crate::error::{CsrfError, Result};
use crate::matcher::{CompiledRule, ExclusionRule};
use std::collections::BTreeSet;

/// Header name carrying the candidate token. Also the body field name.
pub const TOKEN_HEADER: &str = "csrf-token";

/// Default name of the cookie holding the secret.
pub const DEFAULT_COOKIE_KEY: &str = "csrf";

/// Default verification algorithm identifier.
pub const DEFAULT_ALGORITHM: &str = "HMAC-SHA256";

/// Methods protected when none are configured explicitly.
pub const DEFAULT_PROTECTED_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// CSRF protection configuration.
///
/// Built once through [`ProtectionConfig::builder`] and read-only afterwards.
/// Share it behind an `Arc` between concurrently handled requests.
#[derive(Debug, Clone)]
pub struct ProtectionConfig {
    protected_methods: BTreeSet<String>,
    exclusion_rules: Vec<CompiledRule>,
    declared_rules: Vec<ExclusionRule>,
    cookie_key: String,
    algorithm: String,
}

impl ProtectionConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> ProtectionConfigBuilder {
        ProtectionConfigBuilder::default()
    }

    /// Whether requests with this method must carry a valid token.
    ///
    /// Method names are case-sensitive, as in HTTP.
    pub fn is_protected(&self, method: &str) -> bool {
        self.protected_methods.contains(method)
    }

    /// Upper-case names of the protected methods.
    pub fn protected_methods(&self) -> impl Iterator<Item = &str> {
        self.protected_methods.iter().map(String::as_str)
    }

    /// Compiled exclusion rules in declaration order.
    pub fn exclusion_rules(&self) -> &[CompiledRule] {
        &self.exclusion_rules
    }

    /// Exclusion rules as they were declared.
    pub fn declared_rules(&self) -> &[ExclusionRule] {
        &self.declared_rules
    }

    /// Name of the cookie holding the secret.
    pub fn cookie_key(&self) -> &str {
        &self.cookie_key
    }

    /// Algorithm identifier handed to the token verifier.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }
}

/// Builder for [`ProtectionConfig`].
#[derive(Debug, Clone)]
pub struct ProtectionConfigBuilder {
    protected_methods: Vec<String>,
    exclusion_rules: Vec<ExclusionRule>,
    cookie_key: String,
    algorithm: String,
}

impl Default for ProtectionConfigBuilder {
    fn default() -> Self {
        Self {
            protected_methods: DEFAULT_PROTECTED_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            exclusion_rules: Vec::new(),
            cookie_key: DEFAULT_COOKIE_KEY.to_string(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

impl ProtectionConfigBuilder {
    /// Replace the protected methods. An empty list turns the guard into a no-op.
    ///
    /// Names are uppercased at build time, so `"post"` protects `POST`.
    pub fn with_protected_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the exclusion rules.
    pub fn with_exclusions<I, R>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ExclusionRule>,
    {
        self.exclusion_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Append one exclusion rule.
    pub fn exclude(mut self, rule: impl Into<ExclusionRule>) -> Self {
        self.exclusion_rules.push(rule.into());
        self
    }

    /// Set cookie name
    pub fn with_cookie_key(mut self, key: impl Into<String>) -> Self {
        self.cookie_key = key.into();
        self
    }

    /// Set algorithm identifier
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Validate the settings and compile exclusion patterns.
    pub fn build(self) -> Result<ProtectionConfig> {
        if self.cookie_key.trim().is_empty() {
            return Err(CsrfError::MissingCookieKey);
        }

        if self.algorithm.trim().is_empty() {
            return Err(CsrfError::UnsupportedAlgorithm(self.algorithm));
        }

        let mut protected_methods = BTreeSet::new();
        for method in self.protected_methods {
            let method = method.trim().to_ascii_uppercase();
            if method.is_empty() || !method.bytes().all(is_token_char) {
                return Err(CsrfError::InvalidMethod(method));
            }
            protected_methods.insert(method);
        }

        let exclusion_rules = self
            .exclusion_rules
            .iter()
            .map(ExclusionRule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(ProtectionConfig {
            protected_methods,
            exclusion_rules,
            declared_rules: self.exclusion_rules,
            cookie_key: self.cookie_key,
            algorithm: self.algorithm,
        })
    }
}

// RFC 9110 token characters.
fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
