// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM client for the payroll contract.

use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    sol_types::decode_revert_reason,
};
use async_trait::async_trait;

use super::contract::{decode_business_data, IPayrollLedger};
use super::ledger::{classify_submission_error, Ledger, LedgerError};
use super::types::{NetworkConfig, SendResult, TxReceipt};
use crate::models::LedgerRecord;

/// Default interval between receipt polls while waiting for confirmation.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

type PayrollContract = IPayrollLedger::IPayrollLedgerInstance<DynProvider>;

/// Payroll contract client.
///
/// Holds an unsigned provider for reads and, when a wallet is configured, a
/// wallet-filled provider for transactions.
pub struct PayrollLedgerClient {
    /// Network configuration
    network: NetworkConfig,
    /// Deployed contract address
    contract_address: Address,
    reader: PayrollContract,
    writer: Option<PayrollContract>,
    receipt_poll_interval: Duration,
}

impl PayrollLedgerClient {
    /// Create a new client for the contract on the specified network.
    ///
    /// Without a wallet the client is read-only and every write fails with
    /// [`LedgerError::NotConnected`].
    pub fn new(
        network: NetworkConfig,
        contract_address: &str,
        wallet: Option<EthereumWallet>,
    ) -> Result<Self, LedgerError> {
        let url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidData(format!("Invalid RPC URL: {e}")))?;

        let contract_address = Address::from_str(contract_address)
            .map_err(|e| LedgerError::InvalidData(format!("Invalid contract address: {e}")))?;

        let read_provider = ProviderBuilder::new().connect_http(url.clone()).erased();
        let reader = IPayrollLedger::new(contract_address, read_provider);

        let writer = wallet.map(|wallet| {
            let provider = ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(url)
                .erased();
            IPayrollLedger::new(contract_address, provider)
        });

        Ok(Self {
            network,
            contract_address,
            reader,
            writer,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        })
    }

    /// Override the receipt poll interval.
    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Checksummed contract address, used as the confidential-compute scope.
    pub fn contract_address(&self) -> String {
        self.contract_address.to_checksum(None)
    }

    fn writer(&self) -> Result<&PayrollContract, LedgerError> {
        self.writer.as_ref().ok_or(LedgerError::NotConnected)
    }

    fn send_result(&self, tx_hash: &B256) -> SendResult {
        let tx_hash = alloy::hex::encode_prefixed(tx_hash);
        SendResult {
            explorer_url: self.network.tx_url(&tx_hash),
            tx_hash,
        }
    }

    /// Get the receipt of a transaction, if it has been mined.
    pub async fn get_transaction_status(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TxReceipt>, LedgerError> {
        let hash = B256::from_str(tx_hash)
            .map_err(|e| LedgerError::InvalidData(format!("Invalid tx hash: {e}")))?;

        let receipt = self
            .reader
            .provider()
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| LedgerError::Rpc(format!("Failed to get receipt: {e}")))?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash: tx_hash.to_string(),
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used,
            success: r.status(),
        }))
    }
}

/// Map a failed contract write into a structured ledger error, preferring
/// the decoded revert reason over the transport message.
fn submission_error(record_id: &str, err: alloy::contract::Error) -> LedgerError {
    let reason = err
        .as_revert_data()
        .and_then(|data| decode_revert_reason(&data))
        .unwrap_or_else(|| err.to_string());
    classify_submission_error(record_id, &reason)
}

fn decode_hex(field: &str, value: &str) -> Result<Bytes, LedgerError> {
    alloy::hex::decode(value)
        .map(Bytes::from)
        .map_err(|e| LedgerError::InvalidData(format!("Invalid {field}: {e}")))
}

#[async_trait]
impl Ledger for PayrollLedgerClient {
    async fn all_record_ids(&self) -> Result<Vec<String>, LedgerError> {
        self.reader
            .getAllBusinessIds()
            .call()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    async fn record(&self, id: &str) -> Result<LedgerRecord, LedgerError> {
        let data = self
            .reader
            .getBusinessData(id.to_string())
            .call()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;
        Ok(decode_business_data(data))
    }

    async fn ciphertext_handle(&self, id: &str) -> Result<String, LedgerError> {
        let handle = self
            .reader
            .getEncryptedValue(id.to_string())
            .call()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;
        Ok(alloy::hex::encode_prefixed(handle))
    }

    async fn is_available(&self) -> Result<bool, LedgerError> {
        self.reader
            .isAvailable()
            .call()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    async fn create_record(
        &self,
        id: &str,
        name: &str,
        ciphertext: &str,
        proof: &str,
        hours: u64,
        performance: u64,
        description: &str,
    ) -> Result<SendResult, LedgerError> {
        let writer = self.writer()?;
        let handle = B256::from_str(ciphertext)
            .map_err(|e| LedgerError::InvalidData(format!("Invalid ciphertext handle: {e}")))?;
        let proof = decode_hex("input proof", proof)?;

        let pending = writer
            .createBusinessData(
                id.to_string(),
                name.to_string(),
                handle,
                proof,
                U256::from(hours),
                U256::from(performance),
                description.to_string(),
            )
            .send()
            .await
            .map_err(|e| submission_error(id, e))?;

        tracing::debug!(record_id = %id, tx_hash = %pending.tx_hash(), "Create transaction sent");
        Ok(self.send_result(pending.tx_hash()))
    }

    async fn submit_verification(
        &self,
        id: &str,
        abi_encoded_clear_values: &str,
        decryption_proof: &str,
    ) -> Result<SendResult, LedgerError> {
        let writer = self.writer()?;
        let clear_values = decode_hex("clear values", abi_encoded_clear_values)?;
        let proof = decode_hex("decryption proof", decryption_proof)?;

        let pending = writer
            .verifyDecryption(id.to_string(), clear_values, proof)
            .send()
            .await
            .map_err(|e| submission_error(id, e))?;

        tracing::debug!(record_id = %id, tx_hash = %pending.tx_hash(), "Verification transaction sent");
        Ok(self.send_result(pending.tx_hash()))
    }

    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, LedgerError> {
        loop {
            if let Some(receipt) = self.get_transaction_status(tx_hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}
