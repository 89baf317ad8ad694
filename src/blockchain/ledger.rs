// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The ledger collaborator.
//!
//! Read operations never need a signing identity; write operations do.
//! Every failure is reported as a structured [`LedgerError`] so the
//! workflows never inspect error strings.

use async_trait::async_trait;

use super::types::{SendResult, TxReceipt};
use crate::models::LedgerRecord;

/// Revert reason emitted by the payroll contract on a second verification.
pub const ALREADY_VERIFIED_REASON: &str = "Data already verified";

/// Persistent ledger holding payroll records.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Ids of every record, in ledger order.
    async fn all_record_ids(&self) -> Result<Vec<String>, LedgerError>;

    /// Current body of a single record.
    async fn record(&self, id: &str) -> Result<LedgerRecord, LedgerError>;

    /// Ciphertext handle of a record's encrypted salary (0x-prefixed hex).
    async fn ciphertext_handle(&self, id: &str) -> Result<String, LedgerError>;

    /// Whether the contract reports itself ready for use.
    async fn is_available(&self) -> Result<bool, LedgerError>;

    /// Submit a record creation transaction.
    #[allow(clippy::too_many_arguments)]
    async fn create_record(
        &self,
        id: &str,
        name: &str,
        ciphertext: &str,
        proof: &str,
        hours: u64,
        performance: u64,
        description: &str,
    ) -> Result<SendResult, LedgerError>;

    /// Submit a decryption proof for a record.
    ///
    /// Fails with [`LedgerError::AlreadyVerified`] when the record was
    /// verified by someone else first.
    async fn submit_verification(
        &self,
        id: &str,
        abi_encoded_clear_values: &str,
        decryption_proof: &str,
    ) -> Result<SendResult, LedgerError>;

    /// Suspend until a submitted transaction has a receipt.
    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, LedgerError>;
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("No signing identity configured")]
    NotConnected,

    #[error("Transaction rejected by signer")]
    RejectedByUser,

    #[error("Record {0} is already verified")]
    AlreadyVerified(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

/// Classify a failed write into a structured error.
///
/// The contract and wallet only report these conditions as text, so this is
/// the single place where message matching happens.
pub fn classify_submission_error(record_id: &str, message: &str) -> LedgerError {
    let lower = message.to_ascii_lowercase();

    if lower.contains(&ALREADY_VERIFIED_REASON.to_ascii_lowercase()) {
        LedgerError::AlreadyVerified(record_id.to_string())
    } else if lower.contains("user rejected") || lower.contains("user denied") {
        LedgerError::RejectedByUser
    } else {
        LedgerError::TransactionFailed(message.to_string())
    }
}
