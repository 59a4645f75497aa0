//! Request and response types of the KMS HTTP API.
//!
//! Key material travels as standard base64 strings; contexts travel as plain
//! JSON objects of string values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Generate endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/key/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateKeyRequest {
    /// Master key ID. The backend's default key ID is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Context bound to the generated key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

/// Successful response body for `POST /v1/key/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateKeyResponse {
    /// The key ID the data key is bound to.
    pub key_id: String,
    /// Base64 plaintext data key.
    pub plaintext: String,
    /// Base64 sealed data key, safe to persist.
    pub ciphertext: String,
}

// ---------------------------------------------------------------------------
// Unseal endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/key/unseal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsealKeyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Base64 sealed data key as returned by the generate endpoint.
    pub ciphertext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

/// Successful response body for `POST /v1/key/unseal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsealKeyResponse {
    /// Base64 plaintext data key.
    pub plaintext: String,
}

// ---------------------------------------------------------------------------
// Info
// ---------------------------------------------------------------------------

/// Response body for `GET /v1/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub endpoints: Vec<String>,
    pub name: String,
    pub auth_type: String,
    pub default_key_id: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"`.
    pub status: String,
    /// Key ID used when requests omit one.
    pub default_key_id: String,
}
