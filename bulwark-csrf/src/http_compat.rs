//! `http` crate conversions.
//!
//! Builds a [`RequestContext`] from an `http::Request` and turns a
//! [`Rejection`] into an `http::Response`.

use crate::config::ProtectionConfig;
use crate::outcome::Rejection;
use crate::request::RequestContext;
use bytes::Bytes;
use cookie::Cookie;
use http::{header, HeaderValue, Request, Response, StatusCode};
use http_body_util::Full;
use serde_json::Value;
use std::collections::HashMap;

impl RequestContext {
    /// Method, raw path, headers and cookies of a request. The body is left
    /// unparsed.
    pub fn from_http_parts<B>(request: &Request<B>) -> Self {
        let uri = request.uri();
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path())
            .to_string();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in request.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let mut cookies = HashMap::new();
        for value in request.headers().get_all(header::COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse_encoded(value).flatten() {
                cookies
                    .entry(cookie.name().to_string())
                    .or_insert_with(|| cookie.value().to_string());
            }
        }

        Self {
            method: request.method().as_str().to_string(),
            path,
            cookies,
            headers,
            body: None,
        }
    }

    /// Like [`RequestContext::from_http_parts`], and parses the body when the
    /// request method is protected.
    pub fn from_http(request: &Request<Bytes>, config: &ProtectionConfig) -> Self {
        let mut ctx = Self::from_http_parts(request);
        if config.is_protected(&ctx.method) {
            let content_type = request
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            ctx.body = parse_body(content_type, request.body());
        }
        ctx
    }
}

/// Parse a JSON object or urlencoded form body into fields.
///
/// Form content types are decoded as form data. Any other content type is
/// read as JSON, which covers `+json` media types. Without a content type,
/// JSON is tried first, then form data.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Option<HashMap<String, Value>> {
    if body.is_empty() {
        return None;
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("application/x-www-form-urlencoded") => parse_form(body),
        Some(_) => parse_json(body),
        None => parse_json(body).or_else(|| parse_form(body)),
    }
}

fn parse_json(body: &[u8]) -> Option<HashMap<String, Value>> {
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}

fn parse_form(body: &[u8]) -> Option<HashMap<String, Value>> {
    let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(body).ok()?;
    let mut fields = HashMap::new();
    for (key, value) in pairs {
        fields.entry(key).or_insert(Value::String(value));
    }
    Some(fields)
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::FORBIDDEN)
    }

    /// Build the 403 JSON response.
    pub fn into_http_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let mut response = Response::new(Full::new(Bytes::from(self.to_json())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
