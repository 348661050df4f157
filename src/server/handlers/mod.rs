//! Request handlers
//!
//! Handlers only translate between HTTP and the repositories. Payload and
//! query rejections are mapped to `InvalidArgument` so every error leaves the
//! service as the same JSON shape.

pub mod accounts;
pub mod readings;

use super::AppState;
use crate::error::RequestError;
use crate::model::OutcomeReport;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Unwrap a JSON body or reject it as an invalid argument
pub(crate) fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RequestError> {
    body.map(|Json(value)| value)
        .map_err(|e| RequestError::InvalidArgument(e.body_text()))
}

/// Unwrap query parameters or reject them as an invalid argument
pub(crate) fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, RequestError> {
    params
        .map(|Query(value)| value)
        .map_err(|e| RequestError::InvalidArgument(e.body_text()))
}

/// 200 with the report, or 400 if it is a soft failure
pub(crate) fn report<T: Serialize>(report: OutcomeReport<T>) -> Response {
    let status = if report.is_soft_failure() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(report)).into_response()
}

/// `?id=` of the account routes
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub(crate) fn require(self) -> Result<String, RequestError> {
        self.id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| RequestError::InvalidIdentity("empty id provided".into()))
    }
}

/// Liveness probe
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": state.service_name.as_ref(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
