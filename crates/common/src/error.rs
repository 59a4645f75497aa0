//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::UnsealFailure`] → 400
/// - [`ServiceError::Unsupported`] → 501
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: invalid JSON or invalid base64.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The sealed key could not be unsealed with the given key ID and context.
    #[error("unseal failure: {0}")]
    UnsealFailure(String),

    /// The configured KMS backend does not support the operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::UnsealFailure(_) => 400,
            ServiceError::Unsupported(_) => 501,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Returns the short machine-readable code used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::UnsealFailure(_) => "unseal_failed",
            ServiceError::Unsupported(_) => "unsupported",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::UnsealFailure("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Unsupported("x".into()).http_status(), 501);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            ServiceError::BadRequest("x".into()).code(),
            ServiceError::UnsealFailure("x".into()).code(),
            ServiceError::Unsupported("x".into()).code(),
            ServiceError::Internal("x".into()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("ciphertext is not valid base64".into());
        assert!(e.to_string().contains("ciphertext is not valid base64"));
    }
}
