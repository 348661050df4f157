//! HTTP error mapping.
//!
//! Maps application errors to an HTTP status and a JSON body of the form
//! `{"error": <kind>, "message": <text>}`.
//!
//! # Strategy
//! - Gate rejections → 401 (no key), 403 (unknown or under-privileged key),
//!   500 (operation declared with an unknown role)
//! - Caller input errors → 400, missing records → 404
//! - Store, configuration and hashing faults → 500

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use super::{AppError, AuthError, ConfigError, GateRejection, RequestError};

/// Status code and error kind for a gate rejection
pub fn map_rejection(rejection: &GateRejection) -> (StatusCode, &'static str) {
    match rejection {
        GateRejection::NoKey => (StatusCode::UNAUTHORIZED, "NoKey"),
        GateRejection::Unauthenticated => (StatusCode::FORBIDDEN, "Unauthenticated"),
        GateRejection::InvalidRole(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InvalidRole"),
        GateRejection::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "StoreFault"),
    }
}

/// Status code and error kind for a request error
pub fn map_request_error(err: &RequestError) -> (StatusCode, &'static str) {
    match err {
        RequestError::InvalidIdentity(_) => (StatusCode::BAD_REQUEST, "InvalidIdentity"),
        RequestError::EmptyPatch => (StatusCode::BAD_REQUEST, "EmptyPatch"),
        RequestError::EmptyFilter => (StatusCode::BAD_REQUEST, "EmptyFilter"),
        RequestError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "InvalidArgument"),
        RequestError::DuplicateAccount(_) => (StatusCode::BAD_REQUEST, "DuplicateAccount"),
        RequestError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
    }
}

/// Status code and error kind for any application error
pub fn map_app_error(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::Rejected(rejection) => map_rejection(rejection),
        AppError::Request(request) => map_request_error(request),
        AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "StoreFault"),
        AppError::Auth(AuthError::InvalidRole(_)) => (StatusCode::BAD_REQUEST, "InvalidRole"),
        AppError::Auth(AuthError::Hash(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "HashFault"),
        AppError::Config(ConfigError::Missing { .. } | ConfigError::Invalid { .. }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "InvalidConfiguration")
        }
        AppError::Config(_) | AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal"),
    }
}

fn error_body(status: StatusCode, kind: &'static str, message: String) -> Response {
    (status, Json(json!({ "error": kind, "message": message }))).into_response()
}

fn log_error(status: StatusCode, kind: &'static str, message: &str) {
    if status.is_server_error() {
        error!(kind, "{}", message);
    } else {
        warn!(kind, status = status.as_u16(), "{}", message);
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let (status, kind) = map_rejection(&self);
        let message = self.to_string();
        log_error(status, kind, &message);
        error_body(status, kind, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = map_app_error(&self);
        let message = self.to_string();
        log_error(status, kind, &message);
        error_body(status, kind, message)
    }
}
