//! Tower integration.
//!
//! ```rust,ignore
//! use bulwark_csrf::{CsrfGuard, CsrfLayer};
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(CsrfLayer::new(guard))
//!     .service(app);
//! ```

use crate::guard::CsrfGuard;
use crate::outcome::{Rejection, VerificationOutcome};
use crate::request::RequestContext;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::Layer;
use tower_service::Service;

/// Layer wrapping services with [`CsrfService`].
#[derive(Debug, Clone)]
pub struct CsrfLayer {
    guard: CsrfGuard,
}

impl CsrfLayer {
    pub fn new(guard: CsrfGuard) -> Self {
        Self { guard }
    }
}

impl<S> Layer<S> for CsrfLayer {
    type Service = CsrfService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfService {
            inner,
            guard: self.guard.clone(),
        }
    }
}

/// Service answering rejected requests with 403 and forwarding the rest
/// unchanged.
#[derive(Debug, Clone)]
pub struct CsrfService<S> {
    inner: S,
    guard: CsrfGuard,
}

impl<S> CsrfService<S> {
    pub fn new(inner: S, guard: CsrfGuard) -> Self {
        Self { inner, guard }
    }

    pub fn guard(&self) -> &CsrfGuard {
        &self.guard
    }
}

impl<S> Service<Request<Bytes>> for CsrfService<S>
where
    S: Service<Request<Bytes>, Response = Response<Full<Bytes>>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Full<Bytes>>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Bytes>) -> Self::Future {
        let guard = self.guard.clone();
        // Keep the instance that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let ctx = RequestContext::from_http(&req, guard.config());
            match guard.authorize(&ctx).await {
                VerificationOutcome::Rejected => Ok(Rejection::new().into_http_response()),
                _ => inner.call(req).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProtectionConfig;
    use crate::provider::SigningKey;
    use crate::verifier::HmacVerifier;
    use http::StatusCode;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    const KEY: &[u8] = b"test_secret_key_32_bytes_long!!!";

    fn guard() -> CsrfGuard {
        let config = ProtectionConfig::builder()
            .with_protected_methods(["POST"])
            .exclude("/webhook")
            .build()
            .unwrap();
        CsrfGuard::hmac(config, SigningKey::new(KEY).unwrap())
    }

    fn token(secret: &str) -> String {
        HmacVerifier::sign(secret, &SigningKey::new(KEY).unwrap(), "HMAC-SHA256").unwrap()
    }

    /// Inner service counting the requests it receives.
    #[derive(Clone)]
    struct CountingApp {
        hits: Arc<AtomicUsize>,
    }

    impl Service<Request<Bytes>> for CountingApp {
        type Response = Response<Full<Bytes>>;
        type Error = Infallible;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request<Bytes>) -> Self::Future {
            self.hits.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(Response::new(Full::new(Bytes::from_static(b"ok")))))
        }
    }

    fn counting_app(hits: Arc<AtomicUsize>) -> CountingApp {
        CountingApp { hits }
    }

    #[tokio::test]
    async fn test_rejected_request_never_reaches_inner() {
        let hits = Arc::new(AtomicUsize::new(0));
        let service = CsrfLayer::new(guard()).layer(counting_app(hits.clone()));

        let response = service
            .oneshot(Request::post("/pay").body(Bytes::new()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let service = CsrfLayer::new(guard()).layer(counting_app(hits.clone()));

        let request = Request::post("/pay")
            .header("cookie", "csrf=s1")
            .header("csrf-token", token("s1"))
            .body(Bytes::new())
            .unwrap();
        let response = service.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_form_token_passes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let service = CsrfLayer::new(guard()).layer(counting_app(hits.clone()));

        let body = format!("csrf-token={}&amount=1", token("s1"));
        let request = Request::post("/pay")
            .header("cookie", "csrf=s1")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Bytes::from(body))
            .unwrap();
        let response = service.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_safe_and_excluded_pass_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let service = CsrfLayer::new(guard()).layer(counting_app(hits.clone()));

        let get = service
            .clone()
            .oneshot(Request::get("/pay").body(Bytes::new()).unwrap())
            .await
            .unwrap();
        let hook = service
            .oneshot(Request::post("/webhook").body(Bytes::new()).unwrap())
            .await
            .unwrap();

        assert_eq!(get.status(), StatusCode::OK);
        assert_eq!(hook.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
