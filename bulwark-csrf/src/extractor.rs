//! Secret and token extraction.
//!
//! Missing values come back as empty strings. The guard treats an empty
//! secret or token as a failed verification, so every failure produces the
//! same rejection.

use crate::config::TOKEN_HEADER;
use crate::request::header_value;
use serde_json::Value;
use std::collections::HashMap;

/// Resolve the candidate token.
///
/// The `csrf-token` header wins when present and non-empty. Otherwise the
/// `csrf-token` body field is used if a body was supplied and the field is a
/// string. Otherwise the token is empty.
pub fn extract_token(
    headers: &HashMap<String, String>,
    body: Option<&HashMap<String, Value>>,
) -> String {
    if let Some(token) = header_value(headers, TOKEN_HEADER).filter(|t| !t.is_empty()) {
        return token.to_string();
    }

    body.and_then(|fields| fields.get(TOKEN_HEADER))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read the secret from the named cookie.
pub fn extract_secret(cookies: &HashMap<String, String>, cookie_key: &str) -> String {
    cookies.get(cookie_key).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn body(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_header_wins_over_body() {
        let h = headers(&[("csrf-token", "from-header")]);
        let b = body(&[("csrf-token", Value::from("from-body"))]);

        assert_eq!(extract_token(&h, Some(&b)), "from-header");
    }

    #[test]
    fn test_empty_header_falls_back_to_body() {
        let h = headers(&[("csrf-token", "")]);
        let b = body(&[("csrf-token", Value::from("from-body"))]);

        assert_eq!(extract_token(&h, Some(&b)), "from-body");
    }

    #[test]
    fn test_body_only() {
        let b = body(&[("csrf-token", Value::from("from-body"))]);
        assert_eq!(extract_token(&HashMap::new(), Some(&b)), "from-body");
    }

    #[test]
    fn test_non_string_body_field_is_ignored() {
        let b = body(&[("csrf-token", Value::from(42))]);
        assert_eq!(extract_token(&HashMap::new(), Some(&b)), "");
    }

    #[test]
    fn test_nothing_supplied() {
        assert_eq!(extract_token(&HashMap::new(), None), "");
    }

    #[test]
    fn test_header_name_case() {
        let h = headers(&[("CSRF-Token", "t1")]);
        assert_eq!(extract_token(&h, None), "t1");
    }

    #[test]
    fn test_secret_from_cookie() {
        let cookies = headers(&[("csrf", "s1")]);

        assert_eq!(extract_secret(&cookies, "csrf"), "s1");
        assert_eq!(extract_secret(&cookies, "other"), "");
    }
}
