//! # Bulwark CSRF Guard
//!
//! Request-time Cross-Site Request Forgery (CSRF) verification for any HTTP
//! server.
//!
//! ## Features
//!
//! - **Double-submit verification** - cookie secret checked against a
//!   `csrf-token` header or body field
//! - **Pluggable primitives** - bring your own key provider and verifier,
//!   or use the bundled HMAC-SHA256 ones
//! - **Path exclusion** - exact paths or regular expressions with flags
//! - **Uniform rejection** - every failure is the same 403 `EBADCSRFTOKEN`
//! - **Tower integration** - `CsrfLayer` for `http` based stacks
//!
//! ## Quick Start
//!
//! ```rust
//! use bulwark_csrf::{CsrfGuard, ProtectionConfig, SigningKey};
//!
//! let config = ProtectionConfig::builder()
//!     .with_protected_methods(["POST", "PUT", "DELETE"])
//!     .with_cookie_key("csrf")
//!     .exclude("/webhook")
//!     .exclude(("^/api/public/.*", "i"))
//!     .build()
//!     .unwrap();
//!
//! let key = SigningKey::new(b"0123456789abcdef0123456789abcdef".to_vec()).unwrap();
//! let guard = CsrfGuard::hmac(config, key);
//! ```
//!
//! ## Checking a Request
//!
//! ```rust
//! use bulwark_csrf::{
//!     CsrfGuard, HmacVerifier, ProtectionConfig, RequestContext, SigningKey,
//!     VerificationOutcome,
//! };
//!
//! # tokio_test::block_on(async {
//! let key = SigningKey::new(b"0123456789abcdef0123456789abcdef".to_vec()).unwrap();
//! let guard = CsrfGuard::hmac(ProtectionConfig::builder().build().unwrap(), key.clone());
//!
//! // A token previously issued for the cookie secret "s1"
//! let token = HmacVerifier::sign("s1", &key, "HMAC-SHA256").unwrap();
//!
//! let ctx = RequestContext::new("POST", "/pay")
//!     .with_cookie("csrf", "s1")
//!     .with_header("csrf-token", token);
//! assert_eq!(guard.authorize(&ctx).await, VerificationOutcome::Accepted);
//!
//! let forged = RequestContext::new("POST", "/pay").with_cookie("csrf", "s1");
//! let rejection = guard.check(&forged).await.unwrap_err();
//! assert_eq!(rejection.status_code, 403);
//! assert_eq!(rejection.name, "EBADCSRFTOKEN");
//! # });
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod http_compat;
pub mod matcher;
pub mod outcome;
pub mod provider;
pub mod request;
pub mod service;
pub mod verifier;

pub use config::{
    DEFAULT_ALGORITHM, DEFAULT_COOKIE_KEY, DEFAULT_PROTECTED_METHODS, ProtectionConfig,
    ProtectionConfigBuilder, TOKEN_HEADER,
};
pub use error::{CsrfError, Result};
pub use extractor::{extract_secret, extract_token};
pub use guard::{CsrfGuard, authorize, try_authorize};
pub use http_compat::parse_body;
pub use matcher::{CompiledRule, ExclusionRule, is_excluded};
pub use outcome::{BAD_CSRF_TOKEN, REJECTION_MESSAGE, Rejection, VerificationOutcome};
pub use provider::{MIN_KEY_LEN, SecretKeyProvider, SigningKey, StaticKeyProvider};
pub use request::RequestContext;
pub use service::{CsrfLayer, CsrfService};
pub use verifier::{HmacVerifier, TokenVerifier};
