// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential-compute collaborator.
//!
//! The compute service owns the FHE primitives: it produces ciphertexts
//! with input proofs for the ledger, and verifiable decryptions whose proof
//! the ledger checks on-chain. This crate only orchestrates those calls.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod relayer;

pub use relayer::RelayerClient;

/// Ciphertext plus the proof the ledger needs to accept it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    /// Ciphertext handle (0x-prefixed, 32 bytes).
    pub handle: String,
    /// Input proof (0x-prefixed hex).
    pub proof: String,
}

/// Result of a verifiable decryption, ready to be submitted to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionResult {
    /// Clear values keyed by ciphertext handle.
    pub clear_values: HashMap<String, u64>,
    /// ABI encoding of the clear values, in request order.
    pub abi_encoded_clear_values: String,
    /// Proof that the decryption was performed correctly.
    pub decryption_proof: String,
}

impl DecryptionResult {
    /// Clear value for a handle, matching hex case-insensitively.
    pub fn clear_value(&self, handle: &str) -> Option<u64> {
        self.clear_values.get(handle).copied().or_else(|| {
            self.clear_values
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(handle))
                .map(|(_, value)| *value)
        })
    }
}

/// Confidential-compute service used for encryption and decryption.
#[async_trait]
pub trait ConfidentialCompute: Send + Sync {
    /// Prepare the service for use. Idempotent once it has succeeded.
    async fn initialize(&self) -> Result<(), ComputeError>;

    /// Encrypt a value for `target` (the contract), submitted by `identity`.
    async fn encrypt(
        &self,
        target: &str,
        identity: &str,
        value: u64,
    ) -> Result<EncryptedInput, ComputeError>;

    /// Decrypt `handles` publicly, with a proof checkable by `target`.
    async fn request_verifiable_decryption(
        &self,
        handles: &[String],
        target: &str,
    ) -> Result<DecryptionResult, ComputeError>;
}

/// Errors returned by the confidential-compute service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComputeError {
    #[error("Compute service not initialized")]
    NotInitialized,

    #[error("Compute request failed: {0}")]
    Request(String),

    #[error("Compute service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Compute response was invalid: {0}")]
    InvalidResponse(String),
}
