//! Fuzz target for request conversion and authorization.
//!
//! Builds `http` requests from arbitrary parts and runs them through the
//! guard. Requests that need no protection are never rejected.

#![no_main]

use arbitrary::Arbitrary;
use bulwark_csrf::{
    CsrfGuard, ProtectionConfig, RequestContext, SigningKey, VerificationOutcome, parse_body,
};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

fuzz_target!(|data: FuzzRequest| {
    let _ = parse_body(None, &data.body);
    let _ = parse_body(Some("application/x-www-form-urlencoded"), &data.body);

    let Ok(method) = http::Method::from_bytes(data.method.as_bytes()) else {
        return;
    };
    let mut builder = http::Request::builder()
        .method(method)
        .uri(data.path.as_str());
    for (name, value) in &data.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let Ok(request) = builder.body(Bytes::from(data.body)) else {
        return;
    };

    let Ok(config) = ProtectionConfig::builder().exclude("/health").build() else {
        return;
    };
    let Ok(key) = SigningKey::new(b"fuzz_signing_key_32_bytes_long!!".to_vec()) else {
        return;
    };
    let guard = CsrfGuard::hmac(config, key);

    let ctx = RequestContext::from_http(&request, guard.config());
    let Ok(runtime) = tokio::runtime::Builder::new_current_thread().build() else {
        return;
    };
    let outcome = runtime.block_on(guard.authorize(&ctx));

    if !guard.needs_protection(&ctx) {
        assert_ne!(outcome, VerificationOutcome::Rejected);
    }
});
