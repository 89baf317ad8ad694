// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{SendResult, TxReceipt},
    models::{CreatePayrollRequest, PayrollRecord, WalletAddress},
    payroll::{
        Activity, CreatedPayroll, DecryptOutcome, OperationLogEntry, PayrollStats, SessionState,
        SyncReport, TransactionStatus, VerificationSource,
    },
    state::AppState,
};

pub mod health;
pub mod payroll;
pub mod session;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/session", get(session::get_session))
        .route("/session/initialize", post(session::initialize_session))
        .route(
            "/payrolls",
            get(payroll::list_payrolls).post(payroll::create_payroll),
        )
        .route("/payrolls/refresh", post(payroll::refresh_payrolls))
        .route("/payrolls/{id}", get(payroll::get_payroll))
        .route("/payrolls/{id}/decrypt", post(payroll::decrypt_payroll))
        .route("/stats", get(payroll::get_stats))
        .route("/history", get(payroll::get_history))
        .route("/status", get(payroll::get_status))
        .route("/ledger/availability", get(payroll::check_availability))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        session::get_session,
        session::initialize_session,
        payroll::list_payrolls,
        payroll::get_payroll,
        payroll::create_payroll,
        payroll::refresh_payrolls,
        payroll::decrypt_payroll,
        payroll::get_stats,
        payroll::get_history,
        payroll::get_status,
        payroll::check_availability
    ),
    components(
        schemas(
            PayrollRecord,
            CreatePayrollRequest,
            CreatedPayroll,
            DecryptOutcome,
            VerificationSource,
            PayrollStats,
            SyncReport,
            OperationLogEntry,
            TransactionStatus,
            SessionState,
            Activity,
            SendResult,
            TxReceipt,
            WalletAddress,
            payroll::StatsResponse,
            payroll::AvailabilityResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Session", description = "Signing identity and compute readiness"),
        (name = "Payroll", description = "Encrypted payroll records"),
        (name = "Ledger", description = "Ledger contract status")
    )
)]
struct ApiDoc;
