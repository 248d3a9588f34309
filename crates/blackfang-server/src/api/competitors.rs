//! Competitor roster handlers.
//!
//! - `GET    /api/competitors`       list
//! - `POST   /api/competitors`       register
//! - `GET    /api/competitors/{id}`  detail
//! - `PATCH  /api/competitors/{id}`  partial update
//! - `DELETE /api/competitors/{id}`  remove

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use blackfang_core::{Competitor, CompetitorPatch, ConfigError, NewCompetitor, PatchError};
use chrono::Utc;

use crate::middleware::RequestId;

use super::{map_core_error, ApiError, ApiResponse, AppState};

const MAX_NAME_LEN: usize = 200;

fn validation_error(request_id: &str, error: &ConfigError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

fn validate_name(request_id: &str, name: &str) -> Result<(), ApiError> {
    if name.trim().chars().count() > MAX_NAME_LEN {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub(super) async fn list_competitors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Competitor>>> {
    let competitors = state.backend.read().await.dataset.competitors().to_vec();
    ApiResponse::new(competitors, req_id)
}

pub(super) async fn get_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Competitor>>, ApiError> {
    let competitor = state.backend.read().await.dataset.competitor(id).cloned();
    match competitor {
        Some(c) => Ok(ApiResponse::new(c, req_id)),
        None => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("competitor {id} not found"),
        )),
    }
}

pub(super) async fn create_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewCompetitor>,
) -> Result<(StatusCode, Json<ApiResponse<Competitor>>), ApiError> {
    let rid = &req_id.0;
    validate_name(rid, &body.name)?;

    let created = state
        .backend
        .write()
        .await
        .dataset
        .insert_competitor(body, Utc::now())
        .cloned()
        .map_err(|e| validation_error(rid, &e))?;

    tracing::info!(competitor_id = created.id, name = %created.name, "competitor added");
    Ok((StatusCode::CREATED, ApiResponse::new(created, req_id)))
}

pub(super) async fn update_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<CompetitorPatch>,
) -> Result<Json<ApiResponse<Competitor>>, ApiError> {
    let rid = &req_id.0;
    if let Some(name) = &body.name {
        validate_name(rid, name)?;
    }

    let updated = state
        .backend
        .write()
        .await
        .dataset
        .update_competitor(id, body)
        .cloned()
        .map_err(|e| match e {
            PatchError::Core(e) => map_core_error(rid, &e),
            PatchError::Invalid(e) => validation_error(rid, &e),
        })?;

    tracing::info!(competitor_id = id, "competitor updated");
    Ok(ApiResponse::new(updated, req_id))
}

pub(super) async fn delete_competitor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Competitor>>, ApiError> {
    let removed = state
        .backend
        .write()
        .await
        .dataset
        .remove_competitor(id)
        .map_err(|e| map_core_error(&req_id.0, &e))?;

    tracing::info!(competitor_id = id, "competitor removed");
    Ok(ApiResponse::new(removed, req_id))
}
