// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Create-payroll workflow.

use serde::Serialize;
use utoipa::ToSchema;

use super::service::{PayrollService, NOT_CONNECTED_MESSAGE};
use super::status::OUTCOME_DISPLAY;
use crate::blockchain::{SendResult, TxReceipt};
use crate::error::PayrollError;
use crate::models::{CreatePayrollRequest, DEFAULT_RECORD_DESCRIPTION};

/// A record created and confirmed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CreatedPayroll {
    pub id: String,
    pub tx: SendResult,
    pub receipt: TxReceipt,
}

impl PayrollService {
    /// Encrypt a salary, store it on the ledger with its public attributes
    /// and resync.
    pub async fn create_payroll(
        &self,
        request: &CreatePayrollRequest,
    ) -> Result<CreatedPayroll, PayrollError> {
        let _creating = self.activity.creating();
        self.run_create(request).await.inspect_err(|e| {
            let message = match e {
                PayrollError::NotConnected => NOT_CONNECTED_MESSAGE.to_string(),
                other => other.to_string(),
            };
            tracing::warn!(error = %e, "Payroll creation failed");
            self.status.error(message, OUTCOME_DISPLAY);
        })
    }

    async fn run_create(&self, request: &CreatePayrollRequest) -> Result<CreatedPayroll, PayrollError> {
        let identity = self.session.require_ready().await?;

        let input = request
            .parse()
            .map_err(|e| PayrollError::InvalidInput(e.to_string()))?;

        self.status.pending("Creating encrypted payroll record...");
        let id = self.next_record_id();

        tracing::debug!(record_id = %id, "Encrypting salary");
        let encrypted = self
            .compute
            .encrypt(&self.target, identity.as_str(), input.salary)
            .await
            .map_err(|e| PayrollError::EncryptionFailed(e.to_string()))?;

        let sent = self
            .ledger
            .create_record(
                &id,
                &input.employee_name,
                &encrypted.handle,
                &encrypted.proof,
                input.hours,
                input.performance,
                DEFAULT_RECORD_DESCRIPTION,
            )
            .await
            .map_err(PayrollError::from_submission)?;

        tracing::info!(record_id = %id, tx_hash = %sent.tx_hash, "Payroll record submitted");
        self.status.pending("Waiting for transaction confirmation...");

        let receipt = self.await_receipt(&sent).await?;
        if !receipt.success {
            return Err(PayrollError::SubmissionFailed(format!(
                "transaction {} reverted",
                receipt.tx_hash
            )));
        }

        self.resync_after_mutation().await;
        self.log
            .record(format!("Created payroll for {}", input.employee_name));
        self.status
            .success("Payroll created successfully!", OUTCOME_DISPLAY);
        tracing::info!(record_id = %id, block = receipt.block_number, "Payroll record created");

        Ok(CreatedPayroll {
            id,
            tx: sent,
            receipt,
        })
    }
}
