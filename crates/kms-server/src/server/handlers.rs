//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::protocol::{
    ErrorResponse, GenerateKeyRequest, GenerateKeyResponse, HealthResponse, InfoResponse,
    UnsealKeyRequest, UnsealKeyResponse,
};
use common::ServiceError;
use kms::{Context, KmsError};
use tracing::{error, info, warn};

use super::state::AppState;

/// `POST /v1/key/create/:key_id` — create a master key at the backend.
pub async fn create_key(State(state): State<AppState>, Path(key_id): Path<String>) -> Response {
    match state.kms.create_key(&key_id) {
        Ok(()) => {
            info!(key_id = %key_id, "master key created");
            StatusCode::OK.into_response()
        }
        Err(e) => kms_error_response(&key_id, e),
    }
}

/// `POST /v1/key/generate` — generate a data key bound to a key ID and context.
///
/// Falls back to the backend's default key ID when the request names none.
pub async fn generate_key(
    State(state): State<AppState>,
    Json(req): Json<GenerateKeyRequest>,
) -> Response {
    let key_id = req
        .key_id
        .unwrap_or_else(|| state.kms.default_key_id().to_owned());
    let context = req.context.map(Context::from);

    match state.kms.generate_key(&key_id, context.as_ref()) {
        Ok((key, sealed)) => {
            let body = GenerateKeyResponse {
                plaintext: STANDARD.encode(key.as_bytes()),
                ciphertext: STANDARD.encode(sealed.as_bytes()),
                key_id,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => kms_error_response(&key_id, e),
    }
}

/// `POST /v1/key/unseal` — recover a data key from its sealed form.
///
/// The key ID and context must match the ones used at generation.
pub async fn unseal_key(
    State(state): State<AppState>,
    Json(req): Json<UnsealKeyRequest>,
) -> Response {
    let sealed = match STANDARD.decode(req.ciphertext.as_bytes()) {
        Ok(b) => b,
        Err(_) => {
            return service_error_response(&ServiceError::BadRequest(
                "ciphertext is not valid base64".into(),
            ))
        }
    };
    let key_id = req
        .key_id
        .unwrap_or_else(|| state.kms.default_key_id().to_owned());
    let context = req.context.map(Context::from);

    match state.kms.unseal_key(&key_id, &sealed, context.as_ref()) {
        Ok(key) => {
            let body = UnsealKeyResponse {
                plaintext: STANDARD.encode(key.as_bytes()),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => kms_error_response(&key_id, e),
    }
}

/// `GET /v1/info` — non-secret description of the backend.
pub async fn backend_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let info = state.kms.info();
    Json(InfoResponse {
        endpoints: info.endpoints,
        name: info.name,
        auth_type: info.auth_type,
        default_key_id: state.kms.default_key_id().to_owned(),
    })
}

/// `GET /health` — liveness check.
///
/// The backend holds no remote connections, so a running server is healthy.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        default_key_id: state.kms.default_key_id().to_owned(),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn kms_error_response(key_id: &str, err: KmsError) -> Response {
    let service_err = match err {
        KmsError::Unsupported(op) => ServiceError::Unsupported(op.into()),
        KmsError::Unseal => {
            warn!(key_id, "unseal failed");
            ServiceError::UnsealFailure(KmsError::Unseal.to_string())
        }
        KmsError::Fatal(fatal) => {
            // The fault handler has already seen this; only reachable when it returns.
            error!(key_id, error = %fatal, "fatal KMS failure");
            ServiceError::Internal("key generation failed".into())
        }
    };
    service_error_response(&service_err)
}

fn service_error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
