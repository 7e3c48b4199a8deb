use crate::config::ProtectionConfig;
use crate::error::{CsrfError, Result};
use crate::extractor::{extract_secret, extract_token};
use crate::matcher::is_excluded;
use crate::outcome::{Rejection, VerificationOutcome};
use crate::provider::{SecretKeyProvider, SigningKey, StaticKeyProvider};
use crate::request::RequestContext;
use crate::verifier::{HmacVerifier, TokenVerifier};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Decide whether a request may proceed.
///
/// Key provider failures are returned as errors so the caller can tell an
/// infrastructure problem from a forged request. Verifier failures are
/// rejections.
pub async fn try_authorize(
    ctx: &RequestContext,
    config: &ProtectionConfig,
    key_provider: &dyn SecretKeyProvider,
    verifier: &dyn TokenVerifier,
) -> Result<VerificationOutcome> {
    if !config.is_protected(&ctx.method) {
        trace!(method = %ctx.method, "method not protected, skipping CSRF check");
        return Ok(VerificationOutcome::Skipped);
    }

    let secret = extract_secret(&ctx.cookies, config.cookie_key());
    let token = extract_token(&ctx.headers, ctx.body.as_ref());

    if is_excluded(&ctx.path, config.exclusion_rules()) {
        trace!(path = %ctx.path, "path excluded from CSRF protection");
        return Ok(VerificationOutcome::Excluded);
    }

    if secret.is_empty() || token.is_empty() {
        debug!(
            method = %ctx.method,
            path = %ctx.path,
            missing_secret = secret.is_empty(),
            missing_token = token.is_empty(),
            "CSRF check rejected request"
        );
        return Ok(VerificationOutcome::Rejected);
    }

    let key = key_provider
        .signing_key(config)
        .await
        .map_err(|e| match e {
            CsrfError::KeyProvider(_) => e,
            other => CsrfError::KeyProvider(other.to_string()),
        })?;

    match verifier
        .verify(&secret, &token, &key, config.algorithm())
        .await
    {
        Ok(true) => Ok(VerificationOutcome::Accepted),
        Ok(false) => {
            debug!(method = %ctx.method, path = %ctx.path, "CSRF token mismatch");
            Ok(VerificationOutcome::Rejected)
        }
        Err(e) => {
            warn!(path = %ctx.path, error = %e, "CSRF token verification failed");
            Ok(VerificationOutcome::Rejected)
        }
    }
}

/// Like [`try_authorize`], but any error is a rejection.
pub async fn authorize(
    ctx: &RequestContext,
    config: &ProtectionConfig,
    key_provider: &dyn SecretKeyProvider,
    verifier: &dyn TokenVerifier,
) -> VerificationOutcome {
    match try_authorize(ctx, config, key_provider, verifier).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(path = %ctx.path, error = %e, "CSRF signing key unavailable, rejecting request");
            VerificationOutcome::Rejected
        }
    }
}

/// CSRF guard shared by all requests of an application.
#[derive(Clone)]
pub struct CsrfGuard {
    config: Arc<ProtectionConfig>,
    key_provider: Arc<dyn SecretKeyProvider>,
    verifier: Arc<dyn TokenVerifier>,
}

impl CsrfGuard {
    pub fn new(
        config: ProtectionConfig,
        key_provider: impl SecretKeyProvider + 'static,
        verifier: impl TokenVerifier + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            key_provider: Arc::new(key_provider),
            verifier: Arc::new(verifier),
        }
    }

    /// Guard using a fixed key and the bundled HMAC verifier.
    pub fn hmac(config: ProtectionConfig, key: SigningKey) -> Self {
        Self::new(config, StaticKeyProvider::new(key), HmacVerifier::new())
    }

    /// Guard over already shared collaborators.
    pub fn from_shared(
        config: Arc<ProtectionConfig>,
        key_provider: Arc<dyn SecretKeyProvider>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config,
            key_provider,
            verifier,
        }
    }

    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    /// Check if request needs CSRF verification
    pub fn needs_protection(&self, ctx: &RequestContext) -> bool {
        self.config.is_protected(&ctx.method)
            && !is_excluded(&ctx.path, self.config.exclusion_rules())
    }

    pub async fn authorize(&self, ctx: &RequestContext) -> VerificationOutcome {
        authorize(
            ctx,
            &self.config,
            self.key_provider.as_ref(),
            self.verifier.as_ref(),
        )
        .await
    }

    pub async fn try_authorize(&self, ctx: &RequestContext) -> Result<VerificationOutcome> {
        try_authorize(
            ctx,
            &self.config,
            self.key_provider.as_ref(),
            self.verifier.as_ref(),
        )
        .await
    }

    /// Authorize and map a rejection to the response error.
    pub async fn check(&self, ctx: &RequestContext) -> std::result::Result<(), Rejection> {
        self.authorize(ctx).await.into_result().map(|_| ())
    }
}

impl fmt::Debug for CsrfGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfGuard")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
