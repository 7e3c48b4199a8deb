use serde_json::Value;
use std::collections::HashMap;

/// The parts of an inbound request the guard looks at.
///
/// Owned by the request being processed. Header names are stored lower-case
/// when added through [`RequestContext::with_header`]; lookups through
/// [`RequestContext::header`] ignore case either way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    /// HTTP method as received
    pub method: String,

    /// Raw request path, query string included
    pub path: String,

    /// Cookies by name
    pub cookies: HashMap<String, String>,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// Parsed request body, if the host framework parsed one
    pub body: Option<HashMap<String, Value>>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: HashMap<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    /// Add one field to the parsed body, creating the body if needed.
    pub fn with_body_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Get a header value, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Get a cookie value.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

pub(crate) fn header_value<'a>(
    headers: &'a HashMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}
