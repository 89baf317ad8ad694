// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signer loading for payroll transactions.
//!
//! The service signs with a single operator key, supplied either as a PEM
//! file (SEC1 or PKCS#8) or as a raw hex string.

use std::path::Path;

use alloy::{network::EthereumWallet, signers::local::PrivateKeySigner};
use k256::SecretKey;

use super::ledger::LedgerError;

/// Parse a private key from PEM format to hex string.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(LedgerError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, LedgerError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| LedgerError::InvalidData(format!("Invalid UTF-8: {e}")))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| LedgerError::InvalidData(format!("Invalid PEM: {e}")))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| LedgerError::InvalidData(format!("Invalid key format: {e}")))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key (with or without 0x prefix).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| LedgerError::InvalidData(format!("Invalid private key: {e}")))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| LedgerError::InvalidData(format!("Invalid private key: {e}")))
}

/// Create a signer from PEM-encoded private key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, LedgerError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Read a PEM key file and create a signer from it.
pub fn signer_from_pem_file(path: &Path) -> Result<PrivateKeySigner, LedgerError> {
    let bytes = std::fs::read(path).map_err(|e| {
        LedgerError::InvalidData(format!("Failed to read key file {}: {e}", path.display()))
    })?;
    signer_from_pem(&bytes)
}

/// Wrap a signer into a wallet usable by a provider.
pub fn wallet_from_signer(signer: PrivateKeySigner) -> EthereumWallet {
    EthereumWallet::from(signer)
}
