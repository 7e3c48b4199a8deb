//! Path exclusion rules.
//!
//! A rule is either a literal path, compared for exact equality against the
//! raw request path (query string included), or a regular expression with
//! JavaScript-style flags. In configuration files a literal is written as a
//! plain string and a pattern as a `[pattern, flags]` array:
//!
//! ```json
//! ["/webhook", ["^/api/public/.*", "i"]]
//! ```
//!
//! Flags `i`, `m` and `s` change matching. `u`, `v`, `g`, `y` and `d` are
//! accepted and have no effect. Anything else, `x` included, is rejected.

use crate::error::{CsrfError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Exclusion rule as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub enum ExclusionRule {
    /// Exact path match
    Literal(String),
    /// Regular expression source plus flags
    Pattern { source: String, flags: String },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawRule {
    Literal(String),
    Pattern(Vec<String>),
}

impl TryFrom<RawRule> for ExclusionRule {
    type Error = CsrfError;

    fn try_from(raw: RawRule) -> Result<Self> {
        match raw {
            RawRule::Literal(path) => Ok(ExclusionRule::Literal(path)),
            RawRule::Pattern(parts) => {
                let mut parts = parts.into_iter();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(source), flags, None) => Ok(ExclusionRule::Pattern {
                        source,
                        flags: flags.unwrap_or_default(),
                    }),
                    _ => Err(CsrfError::InvalidRule(
                        "pattern rules must be [pattern] or [pattern, flags]".to_string(),
                    )),
                }
            }
        }
    }
}

impl From<ExclusionRule> for RawRule {
    fn from(rule: ExclusionRule) -> Self {
        match rule {
            ExclusionRule::Literal(path) => RawRule::Literal(path),
            ExclusionRule::Pattern { source, flags } => RawRule::Pattern(vec![source, flags]),
        }
    }
}

impl From<&str> for ExclusionRule {
    fn from(path: &str) -> Self {
        ExclusionRule::literal(path)
    }
}

impl From<String> for ExclusionRule {
    fn from(path: String) -> Self {
        ExclusionRule::Literal(path)
    }
}

impl From<(&str, &str)> for ExclusionRule {
    fn from((source, flags): (&str, &str)) -> Self {
        ExclusionRule::pattern(source, flags)
    }
}

impl ExclusionRule {
    /// Rule matching exactly one path.
    pub fn literal(path: impl Into<String>) -> Self {
        ExclusionRule::Literal(path.into())
    }

    /// Rule matching every path the expression finds a match in.
    pub fn pattern(source: impl Into<String>, flags: impl Into<String>) -> Self {
        ExclusionRule::Pattern {
            source: source.into(),
            flags: flags.into(),
        }
    }

    /// Compile the rule for matching.
    ///
    /// Fails on a malformed expression or an unknown flag.
    pub fn compile(&self) -> Result<CompiledRule> {
        match self {
            ExclusionRule::Literal(path) => Ok(CompiledRule::Literal(path.clone())),
            ExclusionRule::Pattern { source, flags } => {
                compile_pattern(source, flags).map(CompiledRule::Pattern)
            }
        }
    }
}

fn compile_pattern(source: &str, flags: &str) -> Result<Regex> {
    let mut builder = RegexBuilder::new(source);

    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            // Unicode is always on; global/sticky/indices don't change a single test.
            'u' | 'v' | 'g' | 'y' | 'd' => {}
            other => {
                return Err(CsrfError::UnsupportedFlag {
                    pattern: source.to_string(),
                    flag: other,
                });
            }
        }
    }

    builder.build().map_err(|source_err| CsrfError::InvalidPattern {
        pattern: source.to_string(),
        source: source_err,
    })
}

/// Exclusion rule ready for matching.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    Literal(String),
    Pattern(Regex),
}

impl CompiledRule {
    /// Check a raw request path against this rule.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            CompiledRule::Literal(literal) => literal == path,
            CompiledRule::Pattern(regex) => regex.is_match(path),
        }
    }
}

/// Check whether a request path is exempt from CSRF verification.
///
/// Rules are evaluated in declaration order and evaluation stops at the first
/// match.
pub fn is_excluded(path: &str, rules: &[CompiledRule]) -> bool {
    rules.iter().any(|rule| rule.matches(path))
}
