// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types shared by the ledger trait and its EVM binding.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// EVM network the payroll contract is deployed on.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: String,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Block explorer URL, if the network has one
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    /// Explorer link for a transaction hash, when an explorer is configured.
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_deref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }
}

/// Sepolia testnet, where the confidential-compute coprocessor is deployed.
pub fn sepolia(rpc_url: impl Into<String>) -> NetworkConfig {
    NetworkConfig {
        name: "Sepolia".to_string(),
        chain_id: 11155111,
        rpc_url: rpc_url.into(),
        explorer_url: Some("https://sepolia.etherscan.io".to_string()),
    }
}

/// Transaction send result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendResult {
    /// Transaction hash
    pub tx_hash: String,
    /// Explorer URL for the transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction was successful
    pub success: bool,
}
