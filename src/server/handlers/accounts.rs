//! `/api/User` handlers

use super::{IdQuery, payload, query, report};
use crate::error::AppError;
use crate::model::{
    AccountFilter, AccountPatch, AccountView, CreatedAccount, NewAccount, OutcomeReport,
    RoleUpdate,
};
use crate::server::AppState;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AccountView>>, AppError> {
    state.accounts.get_all().await.map(Json)
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountView>, AppError> {
    state.accounts.get_by_id(&id).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<OutcomeReport<CreatedAccount>>), AppError> {
    let new = payload(body)?;
    let created = state.accounts.create(new, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_role(
    State(state): State<AppState>,
    params: Result<Query<IdQuery>, QueryRejection>,
    body: Result<Json<RoleUpdate>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = query(params)?.require()?;
    let update = payload(body)?;
    state.accounts.update_role(&id, update.role).await.map(report)
}

pub async fn update_many(
    State(state): State<AppState>,
    body: Result<Json<AccountPatch>, JsonRejection>,
) -> Result<Response, AppError> {
    let patch = payload(body)?;
    state.accounts.update_many(&patch).await.map(report)
}

pub async fn remove(
    State(state): State<AppState>,
    params: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let id = query(params)?.require()?;
    state.accounts.remove(&id).await.map(report)
}

pub async fn remove_many(
    State(state): State<AppState>,
    body: Result<Json<AccountFilter>, JsonRejection>,
) -> Result<Response, AppError> {
    let filter = payload(body)?;
    state.accounts.remove_many(&filter).await.map(report)
}

pub async fn remove_inactive(State(state): State<AppState>) -> Result<Response, AppError> {
    state
        .accounts
        .remove_inactive(Utc::now())
        .await
        .map(report)
}
