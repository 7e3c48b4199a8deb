// Bulwark - request-time CSRF verification for Rust HTTP servers
//
// The guard decides, per request, whether a state-changing call carries a
// token matching the secret in its cookie. Configuration loading lives behind
// the `config` feature.

// Re-export the guard
pub use bulwark_csrf::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use bulwark_config;

#[cfg(feature = "config")]
pub use bulwark_config::{ConfigError, ConfigManager, CsrfSettings};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CsrfError,
        CsrfGuard,
        CsrfLayer,
        CsrfService,
        ExclusionRule,
        HmacVerifier,
        ProtectionConfig,
        Rejection,
        RequestContext,
        SecretKeyProvider,
        SigningKey,
        StaticKeyProvider,
        TokenVerifier,
        VerificationOutcome,
    };

    #[cfg(feature = "config")]
    pub use crate::{ConfigManager, CsrfSettings};
}
