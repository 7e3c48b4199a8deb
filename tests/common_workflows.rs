//! Integration tests for common Bulwark workflows.
//!
//! These tests wire the guard the way an application would: settings from a
//! file, a tower stack in front of the handler, and custom primitives.

use async_trait::async_trait;
use bulwark::prelude::*;
use bulwark::{BAD_CSRF_TOKEN, REJECTION_MESSAGE, Result};
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use std::convert::Infallible;
use std::io::Write;
use tower::{Layer, ServiceExt};

// base64 of "common_workflows_key_32_bytes!!!"
const SECRET: &str = "Y29tbW9uX3dvcmtmbG93c19rZXlfMzJfYnl0ZXMhISE=";

fn settings_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[csurf]
methodsToProtect = ["POST", "PUT", "DELETE"]
excludedUrls = ["/hooks/stripe", ["^/public/", "i"]]
cookieKey = "xsrf"
encryptSecret = "{}"
"#,
        SECRET
    )
    .unwrap();
    file.flush().unwrap();
    file
}

async fn body_text(response: Response<Full<Bytes>>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Settings File -> Tower Stack
// =============================================================================

#[tokio::test]
async fn test_file_configured_tower_stack() {
    let settings = CsrfSettings::from_file(settings_file().path()).unwrap();
    let key = settings.signing_key().unwrap();
    let guard = settings.into_guard().unwrap();
    let token = HmacVerifier::sign("browser-secret", &key, "HMAC-SHA256").unwrap();

    // Echo handler: proves the request reached it unmodified.
    let app = tower::service_fn(|req: Request<Bytes>| async move {
        let text = format!(
            "{} {} {}",
            req.method(),
            req.uri(),
            String::from_utf8_lossy(req.body())
        );
        Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(text))))
    });
    let service = CsrfLayer::new(guard).layer(app);

    // Header token
    let response = service
        .clone()
        .oneshot(
            Request::post("/orders?id=7")
                .header("cookie", "xsrf=browser-secret")
                .header("CSRF-Token", token.as_str())
                .body(Bytes::from_static(b"{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "POST /orders?id=7 {}");

    // JSON body token
    let json = serde_json::json!({ "csrf-token": token.clone(), "qty": 2 }).to_string();
    let response = service
        .clone()
        .oneshot(
            Request::put("/orders/7")
                .header("cookie", "xsrf=browser-secret")
                .header("content-type", "application/json")
                .body(Bytes::from(json.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, format!("PUT /orders/7 {}", json));

    // Missing cookie
    let response = service
        .clone()
        .oneshot(
            Request::delete("/orders/7")
                .header("CSRF-Token", token.as_str())
                .body(Bytes::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let rejection: serde_json::Value =
        serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(rejection["statusCode"], 403);
    assert_eq!(rejection["name"], BAD_CSRF_TOKEN);
    assert_eq!(rejection["message"], REJECTION_MESSAGE);

    // Exclusions and unprotected methods
    for request in [
        Request::post("/hooks/stripe").body(Bytes::new()).unwrap(),
        Request::post("/PUBLIC/signup").body(Bytes::new()).unwrap(),
        Request::patch("/orders/7").body(Bytes::new()).unwrap(),
        Request::get("/orders").body(Bytes::new()).unwrap(),
    ] {
        let response = service.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Literal exclusions compare the raw path, query string included
    let response = service
        .oneshot(
            Request::post("/hooks/stripe?retry=1")
                .body(Bytes::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Custom Primitives
// =============================================================================

/// Token must be the secret reversed, for the tests only.
struct ReversedVerifier;

#[async_trait]
impl TokenVerifier for ReversedVerifier {
    async fn verify(
        &self,
        secret: &str,
        token: &str,
        _key: &SigningKey,
        algorithm: &str,
    ) -> Result<bool> {
        if algorithm != "REVERSE" {
            return Err(CsrfError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        Ok(secret.chars().rev().collect::<String>() == token)
    }
}

/// Provider whose key store is unreachable.
struct OfflineKeyStore;

#[async_trait]
impl SecretKeyProvider for OfflineKeyStore {
    async fn signing_key(&self, _config: &ProtectionConfig) -> Result<SigningKey> {
        Err(CsrfError::KeyProvider("key store offline".to_string()))
    }
}

fn reverse_config() -> ProtectionConfig {
    ProtectionConfig::builder()
        .with_algorithm("REVERSE")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_custom_verifier() {
    let key = SigningKey::from_base64(SECRET).unwrap();
    let guard = CsrfGuard::new(
        reverse_config(),
        StaticKeyProvider::new(key),
        ReversedVerifier,
    );

    let ctx = RequestContext::new("PATCH", "/profile")
        .with_cookie("csrf", "abc")
        .with_body_field("csrf-token", "cba");
    assert_eq!(guard.authorize(&ctx).await, VerificationOutcome::Accepted);
    assert!(guard.check(&ctx).await.is_ok());

    let ctx = RequestContext::new("PATCH", "/profile")
        .with_cookie("csrf", "abc")
        .with_body_field("csrf-token", "abc");
    let rejection = guard.check(&ctx).await.unwrap_err();
    assert_eq!(rejection, Rejection::new());
}

#[tokio::test]
async fn test_unavailable_key_store() {
    let guard = CsrfGuard::new(reverse_config(), OfflineKeyStore, ReversedVerifier);
    let ctx = RequestContext::new("POST", "/profile")
        .with_cookie("csrf", "abc")
        .with_header("csrf-token", "cba");

    // Strict callers see the fault, the default path fails closed.
    assert!(matches!(
        guard.try_authorize(&ctx).await,
        Err(CsrfError::KeyProvider(_))
    ));
    assert_eq!(guard.authorize(&ctx).await, VerificationOutcome::Rejected);

    // Paths that never reach the key store are unaffected.
    assert_eq!(
        guard
            .try_authorize(&RequestContext::new("GET", "/profile"))
            .await
            .unwrap(),
        VerificationOutcome::Skipped
    );
}

// =============================================================================
// Environment Configuration
// =============================================================================

#[test]
fn test_environment_configuration() {
    let mut manager = ConfigManager::with_prefix("WORKFLOW_CSRF");
    manager
        .load_env_from([
            ("WORKFLOW_CSRF_METHODS_TO_PROTECT", "post"),
            ("WORKFLOW_CSRF_EXCLUDED_URLS", r#"[["^/health$", ""]]"#),
            ("WORKFLOW_CSRF_ENCRYPT_SECRET", SECRET),
        ])
        .unwrap();

    let settings: CsrfSettings = manager.load_validated().unwrap();
    let guard = settings.into_guard().unwrap();

    assert!(guard.needs_protection(&RequestContext::new("POST", "/orders")));
    assert!(!guard.needs_protection(&RequestContext::new("POST", "/health")));
    assert!(!guard.needs_protection(&RequestContext::new("PUT", "/orders")));
}
