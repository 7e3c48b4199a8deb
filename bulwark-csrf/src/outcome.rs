use serde::Serialize;
use thiserror::Error;

/// Error kind carried by every CSRF rejection.
pub const BAD_CSRF_TOKEN: &str = "EBADCSRFTOKEN";

/// Message carried by every CSRF rejection.
pub const REJECTION_MESSAGE: &str = "CSRF Token Mismatch";

/// Result of checking one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationOutcome {
    /// Method is not protected
    Skipped,
    /// Path matched an exclusion rule
    Excluded,
    /// Token verified against the secret
    Accepted,
    /// Missing, malformed or mismatched token
    Rejected,
}

impl VerificationOutcome {
    /// Whether the request may continue to the application.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, VerificationOutcome::Rejected)
    }

    /// Turn a rejection into the error the host should answer with.
    pub fn into_result(self) -> Result<Self, Rejection> {
        match self {
            VerificationOutcome::Rejected => Err(Rejection::new()),
            other => Ok(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationOutcome::Skipped => "skipped",
            VerificationOutcome::Excluded => "excluded",
            VerificationOutcome::Accepted => "accepted",
            VerificationOutcome::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The response a host framework sends for a rejected request.
///
/// There is exactly one shape, whatever made verification fail.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{name}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub status_code: u16,
    pub name: &'static str,
    pub message: &'static str,
}

impl Rejection {
    pub fn new() -> Self {
        Self {
            status_code: 403,
            name: BAD_CSRF_TOKEN,
            message: REJECTION_MESSAGE,
        }
    }

    /// JSON body for the rejection response.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "statusCode": self.status_code,
            "name": self.name,
            "message": self.message,
        })
        .to_string()
    }
}

impl Default for Rejection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_allowed() {
        assert!(VerificationOutcome::Skipped.is_allowed());
        assert!(VerificationOutcome::Excluded.is_allowed());
        assert!(VerificationOutcome::Accepted.is_allowed());
        assert!(!VerificationOutcome::Rejected.is_allowed());
    }

    #[test]
    fn test_into_result() {
        assert_eq!(
            VerificationOutcome::Accepted.into_result(),
            Ok(VerificationOutcome::Accepted)
        );

        let rejection = VerificationOutcome::Rejected.into_result().unwrap_err();
        assert_eq!(rejection.status_code, 403);
        assert_eq!(rejection.name, "EBADCSRFTOKEN");
        assert_eq!(rejection.message, "CSRF Token Mismatch");
    }

    #[test]
    fn test_rejection_json() {
        let json: serde_json::Value = serde_json::from_str(&Rejection::new().to_json()).unwrap();

        assert_eq!(json["statusCode"], 403);
        assert_eq!(json["name"], "EBADCSRFTOKEN");
        assert_eq!(json["message"], "CSRF Token Mismatch");
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(
            Rejection::new().to_string(),
            "EBADCSRFTOKEN: CSRF Token Mismatch"
        );
    }
}
