// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::LedgerError;

/// Failures of the payroll workflows.
///
/// None of these abort the session or touch the record store; they are
/// reported through the transient status and returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayrollError {
    #[error("Wallet not connected or session not ready")]
    NotConnected,

    #[error("Confidential compute initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Failed to load record {id}: {reason}")]
    SyncPartialFailure { id: String, reason: String },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Transaction rejected by user")]
    SubmissionRejectedByUser,

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Record {0} is already verified")]
    AlreadyVerified(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl PayrollError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            PayrollError::NotConnected => "not_connected",
            PayrollError::InitializationFailed(_) => "initialization_failed",
            PayrollError::SyncPartialFailure { .. } => "sync_partial_failure",
            PayrollError::EncryptionFailed(_) => "encryption_failed",
            PayrollError::SubmissionRejectedByUser => "submission_rejected_by_user",
            PayrollError::SubmissionFailed(_) => "submission_failed",
            PayrollError::AlreadyVerified(_) => "already_verified",
            PayrollError::DecryptionFailed(_) => "decryption_failed",
            PayrollError::ServiceUnavailable(_) => "service_unavailable",
            PayrollError::InvalidInput(_) => "invalid_input",
            PayrollError::NotFound(_) => "not_found",
        }
    }

    /// Map a failed ledger write.
    pub fn from_submission(err: LedgerError) -> Self {
        match err {
            LedgerError::NotConnected => PayrollError::NotConnected,
            LedgerError::RejectedByUser => PayrollError::SubmissionRejectedByUser,
            LedgerError::AlreadyVerified(id) => PayrollError::AlreadyVerified(id),
            other => PayrollError::SubmissionFailed(other.to_string()),
        }
    }

    /// Map a failed ledger read.
    pub fn from_read(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => PayrollError::NotFound(id),
            other => PayrollError::ServiceUnavailable(other.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_code: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<PayrollError> for ApiError {
    fn from(err: PayrollError) -> Self {
        let status = match &err {
            PayrollError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PayrollError::NotFound(_) => StatusCode::NOT_FOUND,
            PayrollError::AlreadyVerified(_) | PayrollError::SubmissionRejectedByUser => {
                StatusCode::CONFLICT
            }
            PayrollError::NotConnected => StatusCode::PRECONDITION_FAILED,
            PayrollError::EncryptionFailed(_)
            | PayrollError::DecryptionFailed(_)
            | PayrollError::SubmissionFailed(_)
            | PayrollError::SyncPartialFailure { .. } => StatusCode::BAD_GATEWAY,
            PayrollError::InitializationFailed(_) | PayrollError::ServiceUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        Self {
            status,
            message: err.to_string(),
            error_code: Some(err.error_code()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.error_code,
        });
        (self.status, body).into_response()
    }
}
