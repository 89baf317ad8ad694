// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decrypt-and-verify workflow.
//!
//! A salary is revealed by asking the compute service for a verifiable
//! decryption and recording the proof on the ledger. Once a record is
//! verified its value is read back from the ledger instead; no second
//! decryption is requested.

use serde::Serialize;
use utoipa::ToSchema;

use super::service::{PayrollService, NOT_CONNECTED_MESSAGE};
use super::status::OUTCOME_DISPLAY;
use crate::error::PayrollError;

/// How the returned value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    /// This call submitted the proof.
    Verified,
    /// The record was already verified before this call.
    PreviouslyVerified,
    /// Another caller verified the record while this call was in flight.
    VerifiedConcurrently,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DecryptOutcome {
    pub record_id: String,
    pub value: u64,
    pub source: VerificationSource,
}

impl PayrollService {
    /// Reveal a record's salary, verifying the decryption on-chain when it
    /// has not been verified yet.
    pub async fn decrypt_salary(&self, id: &str) -> Result<DecryptOutcome, PayrollError> {
        let _decrypting = self.activity.decrypting();
        self.run_decrypt(id).await.inspect_err(|e| {
            let message = match e {
                PayrollError::NotConnected => NOT_CONNECTED_MESSAGE.to_string(),
                PayrollError::DecryptionFailed(reason) | PayrollError::SubmissionFailed(reason) => {
                    format!("Decryption failed: {reason}")
                }
                other => format!("Decryption failed: {other}"),
            };
            tracing::warn!(record_id = %id, error = %e, "Salary decryption failed");
            self.status.error(message, OUTCOME_DISPLAY);
        })
    }

    async fn run_decrypt(&self, id: &str) -> Result<DecryptOutcome, PayrollError> {
        self.session.require_ready().await?;

        let record = self
            .ledger
            .record(id)
            .await
            .map_err(PayrollError::from_read)?;
        if record.verified {
            self.status
                .success("Salary already verified on-chain", OUTCOME_DISPLAY);
            self.log
                .record(format!("Viewed verified salary for record {id}"));
            return Ok(DecryptOutcome {
                record_id: id.to_string(),
                value: record.decrypted_value,
                source: VerificationSource::PreviouslyVerified,
            });
        }

        let handle = self
            .ledger
            .ciphertext_handle(id)
            .await
            .map_err(PayrollError::from_read)?;

        tracing::debug!(record_id = %id, handle = %handle, "Requesting verifiable decryption");
        let decryption = self
            .compute
            .request_verifiable_decryption(std::slice::from_ref(&handle), &self.target)
            .await
            .map_err(|e| PayrollError::DecryptionFailed(e.to_string()))?;

        self.status.pending("Verifying decryption on-chain...");
        let sent = match self
            .ledger
            .submit_verification(
                id,
                &decryption.abi_encoded_clear_values,
                &decryption.decryption_proof,
            )
            .await
            .map_err(PayrollError::from_submission)
        {
            Ok(sent) => sent,
            Err(PayrollError::AlreadyVerified(_)) => return self.recover_verified(id).await,
            Err(e) => return Err(e),
        };

        let receipt = self.await_receipt(&sent).await?;
        if !receipt.success {
            // A reverted verification usually means another caller won.
            let current = self
                .ledger
                .record(id)
                .await
                .map_err(PayrollError::from_read)?;
            if current.verified {
                return self.recover_verified(id).await;
            }
            return Err(PayrollError::SubmissionFailed(format!(
                "verification transaction {} reverted",
                receipt.tx_hash
            )));
        }

        self.resync_after_mutation().await;

        let value = match decryption.clear_value(&handle) {
            Some(value) => value,
            None => self.proven_value(id, &handle).await?,
        };

        self.log
            .record(format!("Decrypted and verified salary for record {id}"));
        self.status
            .success("Salary decrypted and verified successfully!", OUTCOME_DISPLAY);
        tracing::info!(record_id = %id, tx_hash = %receipt.tx_hash, "Salary verified on-chain");

        Ok(DecryptOutcome {
            record_id: id.to_string(),
            value,
            source: VerificationSource::Verified,
        })
    }

    /// The relayer omitted the clear value, but the proof has landed: read
    /// the value the ledger recorded.
    async fn proven_value(&self, id: &str, handle: &str) -> Result<u64, PayrollError> {
        tracing::warn!(record_id = %id, handle = %handle, "No clear value returned, reading ledger");
        let record = self
            .ledger
            .record(id)
            .await
            .map_err(PayrollError::from_read)?;
        if record.verified {
            Ok(record.decrypted_value)
        } else {
            Err(PayrollError::DecryptionFailed(format!(
                "no clear value returned for handle {handle}"
            )))
        }
    }

    /// Another caller verified `id` first: return the value it proved.
    async fn recover_verified(&self, id: &str) -> Result<DecryptOutcome, PayrollError> {
        tracing::warn!(record_id = %id, "Record verified concurrently, reading stored value");
        self.status
            .success("Salary is already verified on-chain", OUTCOME_DISPLAY);
        self.resync_after_mutation().await;

        let record = self
            .ledger
            .record(id)
            .await
            .map_err(PayrollError::from_read)?;
        if !record.verified {
            return Err(PayrollError::DecryptionFailed(format!(
                "record {id} reported verified but holds no proven value"
            )));
        }

        self.log
            .record(format!("Viewed verified salary for record {id}"));
        Ok(DecryptOutcome {
            record_id: id.to_string(),
            value: record.decrypted_value,
            source: VerificationSource::VerifiedConcurrently,
        })
    }
}
