// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payroll endpoints.
//!
//! Mutating endpoints refuse a second trigger with 409 while the matching
//! workflow is already running.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::{CreatePayrollRequest, PayrollRecord},
    payroll::{
        CreatedPayroll, DecryptOutcome, OperationLogEntry, PayrollStats, SyncReport,
        TransactionStatus,
    },
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: PayrollStats,
    /// Records per performance score; index `i` is score `i + 1`.
    pub performance_distribution: Vec<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[utoipa::path(
    get,
    path = "/v1/payrolls",
    tag = "Payroll",
    responses((status = 200, body = [PayrollRecord]))
)]
pub async fn list_payrolls(State(state): State<AppState>) -> Json<Vec<PayrollRecord>> {
    Json(state.payroll.records().await)
}

#[utoipa::path(
    get,
    path = "/v1/payrolls/{id}",
    params(("id" = String, Path, description = "Payroll record id")),
    tag = "Payroll",
    responses(
        (status = 200, body = PayrollRecord),
        (status = 404, description = "Record not in the current snapshot")
    )
)]
pub async fn get_payroll(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PayrollRecord>, ApiError> {
    state
        .payroll
        .record(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Payroll record {id} not found")))
}

#[utoipa::path(
    post,
    path = "/v1/payrolls",
    request_body = CreatePayrollRequest,
    tag = "Payroll",
    responses(
        (status = 201, body = CreatedPayroll),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Creation already in progress or rejected by signer"),
        (status = 412, description = "Session not ready"),
        (status = 502, description = "Encryption or submission failed")
    )
)]
pub async fn create_payroll(
    State(state): State<AppState>,
    Json(request): Json<CreatePayrollRequest>,
) -> Result<(StatusCode, Json<CreatedPayroll>), ApiError> {
    if state.payroll.activity().creating {
        return Err(ApiError::conflict("A payroll record is already being created"));
    }
    let created = state.payroll.create_payroll(&request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/v1/payrolls/refresh",
    tag = "Payroll",
    responses(
        (status = 200, body = SyncReport),
        (status = 409, description = "Refresh already in progress"),
        (status = 412, description = "Session not ready"),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn refresh_payrolls(State(state): State<AppState>) -> Result<Json<SyncReport>, ApiError> {
    if state.payroll.activity().refreshing {
        return Err(ApiError::conflict("A refresh is already in progress"));
    }
    Ok(Json(state.payroll.sync_all().await?))
}

#[utoipa::path(
    post,
    path = "/v1/payrolls/{id}/decrypt",
    params(("id" = String, Path, description = "Payroll record id")),
    tag = "Payroll",
    responses(
        (status = 200, body = DecryptOutcome),
        (status = 404, description = "Record not found on the ledger"),
        (status = 409, description = "Decryption already in progress"),
        (status = 412, description = "Session not ready"),
        (status = 502, description = "Decryption or submission failed")
    )
)]
pub async fn decrypt_payroll(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DecryptOutcome>, ApiError> {
    if state.payroll.activity().decrypting {
        return Err(ApiError::conflict("A decryption is already in progress"));
    }
    Ok(Json(state.payroll.decrypt_salary(&id).await?))
}

#[utoipa::path(
    get,
    path = "/v1/stats",
    tag = "Payroll",
    responses((status = 200, body = StatsResponse))
)]
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.payroll.stats().await;
    let distribution = state.payroll.performance_distribution().await;
    Json(StatsResponse {
        stats,
        performance_distribution: distribution.to_vec(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/history",
    tag = "Payroll",
    responses((status = 200, body = [OperationLogEntry]))
)]
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<OperationLogEntry>> {
    Json(state.payroll.history())
}

#[utoipa::path(
    get,
    path = "/v1/status",
    tag = "Payroll",
    responses((status = 200, body = TransactionStatus))
)]
pub async fn get_status(State(state): State<AppState>) -> Json<TransactionStatus> {
    Json(state.payroll.status())
}

#[utoipa::path(
    get,
    path = "/v1/ledger/availability",
    tag = "Ledger",
    responses(
        (status = 200, body = AvailabilityResponse),
        (status = 503, description = "Availability call failed")
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let available = state.payroll.check_availability().await?;
    Ok(Json(AvailabilityResponse { available }))
}
