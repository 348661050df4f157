//! `/api/WeatherData` handlers

use super::{payload, query, report};
use crate::error::{AppError, RequestError};
use crate::model::{OutcomeReport, Reading, ReadingFilter, ReadingPatch};
use crate::server::AppState;
use crate::store::RecordId;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, AppError> {
    state.readings.get_all().await.map(Json)
}

pub async fn filtered(
    State(state): State<AppState>,
    params: Result<Query<ReadingFilter>, QueryRejection>,
) -> Result<Json<Vec<Reading>>, AppError> {
    let filter = query(params)?;
    state.readings.get_filtered(&filter).await.map(Json)
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reading>, AppError> {
    state.readings.get_by_id(&id).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Reading>, JsonRejection>,
) -> Result<(StatusCode, Json<Reading>), AppError> {
    let reading = payload(body)?;
    let created = state.readings.create(reading).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_many(
    State(state): State<AppState>,
    body: Result<Json<Vec<Reading>>, JsonRejection>,
) -> Result<(StatusCode, Json<OutcomeReport<Vec<RecordId>>>), AppError> {
    let readings = payload(body)?;
    let created = state.readings.create_many(readings).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Reading>, JsonRejection>,
) -> Result<Response, AppError> {
    let replacement = payload(body)?;
    state.readings.replace(&id, replacement).await.map(report)
}

pub async fn update_many(
    State(state): State<AppState>,
    body: Result<Json<ReadingPatch>, JsonRejection>,
) -> Result<Response, AppError> {
    let patch = payload(body)?;
    state.readings.update_many(&patch).await.map(report)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.readings.delete(&id).await.map(report)
}

pub async fn delete_many(
    State(state): State<AppState>,
    body: Result<Json<ReadingFilter>, JsonRejection>,
) -> Result<Response, AppError> {
    let filter = payload(body)?;
    state.readings.delete_many(&filter).await.map(report)
}

/// `?days=` of the age sweep
#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

pub async fn delete_older_than(
    State(state): State<AppState>,
    params: Result<Query<DaysQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let days = query(params)?
        .days
        .ok_or_else(|| RequestError::InvalidArgument("days is required".into()))?;
    state
        .readings
        .delete_older_than(days, Utc::now())
        .await
        .map(report)
}
