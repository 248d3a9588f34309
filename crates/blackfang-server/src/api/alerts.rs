//! Alert feed handlers.
//!
//! - `GET  /api/alerts?severity=&limit=&offset=`
//! - `POST /api/alerts/{id}/read`
//! - `POST /api/alerts/read-all`
//! - `POST /api/alerts/{id}/archive`

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use blackfang_core::wire::{AlertPage, MarkAllReadResult};
use blackfang_core::{Alert, Severity};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_core_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AlertQuery {
    pub severity: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub(super) async fn list_alerts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AlertQuery>,
) -> Json<ApiResponse<AlertPage>> {
    // Severity tokens are stored upper-case; the query is not case-sensitive.
    let severity = query
        .severity
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
        .map(|s| Severity::from(s.to_ascii_uppercase().as_str()));

    let page = state.backend.read().await.alert_page(
        severity.as_ref(),
        normalize_limit(query.limit),
        query.offset.unwrap_or(0),
    );
    ApiResponse::new(page, req_id)
}

pub(super) async fn mark_read(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Alert>>, ApiError> {
    let rid = &req_id.0;
    let mut backend = state.backend.write().await;
    if backend.is_archived(id) {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("alert {id} not found"),
        ));
    }
    backend
        .dataset
        .set_alert_read_state(id, true)
        .map_err(|e| map_core_error(rid, &e))?;
    let alert = backend.visible_alert(id).cloned();
    drop(backend);

    tracing::debug!(alert_id = id, "alert marked read");
    alert
        .map(|a| ApiResponse::new(a, req_id.clone()))
        .ok_or_else(|| ApiError::new(&req_id.0, "internal_error", "alert vanished"))
}

pub(super) async fn mark_all_read(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<MarkAllReadResult>> {
    let updated = state.backend.write().await.dataset.mark_all_read();
    tracing::info!(updated, "all alerts marked read");
    ApiResponse::new(MarkAllReadResult { updated }, req_id)
}

pub(super) async fn archive(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Alert>>, ApiError> {
    let rid = &req_id.0;
    let mut backend = state.backend.write().await;
    backend
        .archive_alert(id)
        .map_err(|e| map_core_error(rid, &e))?;
    let alert = backend
        .dataset
        .alert(id)
        .cloned()
        .ok_or_else(|| ApiError::new(rid, "internal_error", "alert vanished"))?;
    drop(backend);

    tracing::info!(alert_id = id, "alert archived");
    Ok(ApiResponse::new(alert, req_id))
}
