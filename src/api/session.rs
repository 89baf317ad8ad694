// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{error::ApiError, payroll::SessionState, state::AppState};

#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses((status = 200, body = SessionState))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.payroll.session_state().await)
}

/// Initialize the confidential-compute service for the connected identity.
///
/// No-op when already ready or initializing.
#[utoipa::path(
    post,
    path = "/v1/session/initialize",
    tag = "Session",
    responses(
        (status = 200, body = SessionState),
        (status = 412, description = "No signing identity connected"),
        (status = 503, description = "Initialization failed")
    )
)]
pub async fn initialize_session(
    State(state): State<AppState>,
) -> Result<Json<SessionState>, ApiError> {
    Ok(Json(state.payroll.ensure_ready().await?))
}
