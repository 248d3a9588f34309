//! GET /api/dashboard: statistics, recent alerts, and the competitor roster
//! in one payload.

use axum::{extract::State, Extension, Json};
use blackfang_core::wire::DashboardData;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<DashboardData>> {
    let data = state.backend.read().await.dashboard();
    ApiResponse::new(data, req_id)
}
