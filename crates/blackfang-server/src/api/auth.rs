//! `/api/auth/*`: demo-credential login and bearer session lifecycle.

use axum::{extract::State, Extension, Json};
use blackfang_core::wire::{LoginRequest, LoginResponse, LogoutResult, RefreshRequest, TokenPair};
use blackfang_core::User;
use chrono::Utc;

use crate::middleware::{RequestId, Session};

use super::{map_core_error, ApiError, ApiResponse, AppState};

/// POST /api/auth/login
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if let Err(e) = state.credentials.verify(body.email.trim(), &body.password) {
        tracing::warn!("login rejected");
        return Err(map_core_error(&req_id.0, &e));
    }

    let mut backend = state.backend.write().await;
    let user = backend.dataset.user().clone();
    let tokens = backend.sessions.issue(user.id, Utc::now());
    drop(backend);

    tracing::info!(user_id = user.id, "session issued");
    Ok(ApiResponse::new(LoginResponse { user, tokens }, req_id))
}

/// POST /api/auth/refresh
pub(super) async fn refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let rotated = state
        .backend
        .write()
        .await
        .sessions
        .rotate(&body.refresh_token, Utc::now());

    match rotated {
        Some(tokens) => Ok(ApiResponse::new(tokens, req_id)),
        None => Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "invalid or expired refresh token",
        )),
    }
}

/// POST /api/auth/logout
pub(super) async fn logout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<Session>,
) -> Json<ApiResponse<LogoutResult>> {
    let revoked = state
        .backend
        .write()
        .await
        .sessions
        .revoke(&session.access_token);
    tracing::info!(user_id = session.user_id, "session revoked");
    ApiResponse::new(LogoutResult { revoked }, req_id)
}

/// GET /api/auth/me
pub(super) async fn me(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<User>> {
    let user = state.backend.read().await.dataset.user().clone();
    ApiResponse::new(user, req_id)
}
