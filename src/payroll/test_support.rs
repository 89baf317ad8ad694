// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory fakes of the ledger and the compute service.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::service::{PayrollService, WorkflowSettings};
use crate::blockchain::{Ledger, LedgerError, SendResult, TxReceipt};
use crate::compute::{ComputeError, ConfidentialCompute, DecryptionResult, EncryptedInput};
use crate::models::{LedgerRecord, WalletAddress};

pub const TEST_CONTRACT: &str = "0x2222222222222222222222222222222222222222";
pub const TEST_IDENTITY: &str = "0x1111111111111111111111111111111111111111";

pub fn sample_record(name: &str, hours: u64, performance: u64) -> LedgerRecord {
    LedgerRecord {
        name: name.to_string(),
        public_hours: hours,
        public_performance: performance,
        description: "Encrypted Payroll Record".to_string(),
        timestamp: 1_718_000_000,
        creator: TEST_IDENTITY.to_string(),
        verified: false,
        decrypted_value: 0,
    }
}

pub fn verified_record(name: &str, value: u64) -> LedgerRecord {
    LedgerRecord {
        verified: true,
        decrypted_value: value,
        ..sample_record(name, 160, 8)
    }
}

/// Build a service over fresh fakes, not yet connected.
pub fn service_with(
    settings: WorkflowSettings,
) -> (PayrollService, Arc<InMemoryLedger>, Arc<FakeCompute>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let compute = Arc::new(FakeCompute::new());
    let service = PayrollService::new(ledger.clone(), compute.clone(), TEST_CONTRACT, settings);
    (service, ledger, compute)
}

/// A service whose session is connected and ready.
pub async fn ready_service() -> (PayrollService, Arc<InMemoryLedger>, Arc<FakeCompute>) {
    let (service, ledger, compute) = service_with(WorkflowSettings::default());
    service.connect(WalletAddress::from(TEST_IDENTITY)).await;
    service
        .ensure_ready()
        .await
        .expect("fake compute initializes");
    (service, ledger, compute)
}

fn tx_hash(n: usize) -> String {
    format!("0x{n:064x}")
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Default)]
struct LedgerState {
    order: Vec<String>,
    records: HashMap<String, LedgerRecord>,
    handles: HashMap<String, String>,
    failing_reads: HashSet<String>,
    next_write_error: Option<LedgerError>,
}

#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    fail_id_listing: AtomicBool,
    unavailable: AtomicBool,
    stall_confirmations: AtomicBool,
    revert_receipts: AtomicBool,
    tx_counter: AtomicUsize,
    created: AtomicUsize,
    verification_writes: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, id: &str, record: LedgerRecord) {
        let mut state = self.state.lock().unwrap();
        if !state.records.contains_key(id) {
            state.order.push(id.to_string());
        }
        state.records.insert(id.to_string(), record);
    }

    pub fn seed_handle(&self, id: &str, handle: &str) {
        let mut state = self.state.lock().unwrap();
        state.handles.insert(id.to_string(), handle.to_string());
    }

    pub fn fail_reads_for(&self, id: &str) {
        self.state.lock().unwrap().failing_reads.insert(id.to_string());
    }

    pub fn fail_id_listing(&self, fail: bool) {
        self.fail_id_listing.store(fail, Ordering::SeqCst);
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Make the next write fail with `err` at submission.
    pub fn fail_next_write(&self, err: LedgerError) {
        self.state.lock().unwrap().next_write_error = Some(err);
    }

    /// Never deliver receipts.
    pub fn stall_confirmations(&self, stall: bool) {
        self.stall_confirmations.store(stall, Ordering::SeqCst);
    }

    pub fn revert_receipts(&self, revert: bool) {
        self.revert_receipts.store(revert, Ordering::SeqCst);
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn verification_writes(&self) -> usize {
        self.verification_writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self, id: &str) -> Option<LedgerRecord> {
        self.state.lock().unwrap().records.get(id).cloned()
    }

    fn send(&self) -> SendResult {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        SendResult {
            tx_hash: tx_hash(n),
            explorer_url: None,
        }
    }
}

fn decode_abi_word(encoded: &str) -> Result<u64, LedgerError> {
    let digits = encoded.trim_start_matches("0x").trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|e| LedgerError::InvalidData(e.to_string()))
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn all_record_ids(&self) -> Result<Vec<String>, LedgerError> {
        if self.fail_id_listing.load(Ordering::SeqCst) {
            return Err(LedgerError::Rpc("connection refused".to_string()));
        }
        Ok(self.state.lock().unwrap().order.clone())
    }

    async fn record(&self, id: &str) -> Result<LedgerRecord, LedgerError> {
        let state = self.state.lock().unwrap();
        if state.failing_reads.contains(id) {
            return Err(LedgerError::Rpc(format!("read of {id} failed")));
        }
        state
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    async fn ciphertext_handle(&self, id: &str) -> Result<String, LedgerError> {
        let state = self.state.lock().unwrap();
        if !state.records.contains_key(id) {
            return Err(LedgerError::NotFound(id.to_string()));
        }
        Ok(state
            .handles
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("0x{:0>64}", "0")))
    }

    async fn is_available(&self) -> Result<bool, LedgerError> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }

    async fn create_record(
        &self,
        id: &str,
        name: &str,
        ciphertext: &str,
        _proof: &str,
        hours: u64,
        performance: u64,
        description: &str,
    ) -> Result<SendResult, LedgerError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.next_write_error.take() {
            return Err(err);
        }
        if state.records.contains_key(id) {
            return Err(LedgerError::TransactionFailed(format!(
                "record {id} already exists"
            )));
        }

        state.order.push(id.to_string());
        state.records.insert(
            id.to_string(),
            LedgerRecord {
                name: name.to_string(),
                public_hours: hours,
                public_performance: performance,
                description: description.to_string(),
                timestamp: 1_718_000_000,
                creator: TEST_IDENTITY.to_string(),
                verified: false,
                decrypted_value: 0,
            },
        );
        state.handles.insert(id.to_string(), ciphertext.to_string());
        drop(state);

        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.send())
    }

    async fn submit_verification(
        &self,
        id: &str,
        abi_encoded_clear_values: &str,
        _decryption_proof: &str,
    ) -> Result<SendResult, LedgerError> {
        let value = decode_abi_word(abi_encoded_clear_values)?;

        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.next_write_error.take() {
            return Err(err);
        }
        let record = state
            .records
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        if record.verified {
            return Err(LedgerError::AlreadyVerified(id.to_string()));
        }
        record.verified = true;
        record.decrypted_value = value;
        drop(state);

        self.verification_writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.send())
    }

    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<TxReceipt, LedgerError> {
        if self.stall_confirmations.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(TxReceipt {
            tx_hash: tx_hash.to_string(),
            block_number: 1,
            gas_used: 21_000,
            success: !self.revert_receipts.load(Ordering::SeqCst),
        })
    }
}

// =============================================================================
// Compute
// =============================================================================

#[derive(Default)]
pub struct FakeCompute {
    values: Mutex<HashMap<String, u64>>,
    yield_on_init: bool,
    fail_initialize: AtomicBool,
    fail_encrypt: AtomicBool,
    fail_decrypt: AtomicBool,
    omit_clear_values: AtomicBool,
    init_calls: AtomicUsize,
    encrypt_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

impl FakeCompute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield inside `initialize` so concurrent callers interleave.
    pub fn with_yielding_init(mut self) -> Self {
        self.yield_on_init = true;
        self
    }

    pub fn fail_initialize(&self, fail: bool) {
        self.fail_initialize.store(fail, Ordering::SeqCst);
    }

    pub fn fail_encrypt(&self, fail: bool) {
        self.fail_encrypt.store(fail, Ordering::SeqCst);
    }

    pub fn fail_decrypt(&self, fail: bool) {
        self.fail_decrypt.store(fail, Ordering::SeqCst);
    }

    /// Return decryptions that lack the requested handle.
    pub fn omit_clear_values(&self, omit: bool) {
        self.omit_clear_values.store(omit, Ordering::SeqCst);
    }

    pub fn register(&self, handle: &str, value: u64) {
        self.values
            .lock()
            .unwrap()
            .insert(handle.to_string(), value);
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfidentialCompute for FakeCompute {
    async fn initialize(&self) -> Result<(), ComputeError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_on_init {
            tokio::task::yield_now().await;
        }
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(ComputeError::Request("relayer unreachable".to_string()));
        }
        Ok(())
    }

    async fn encrypt(
        &self,
        _target: &str,
        _identity: &str,
        value: u64,
    ) -> Result<EncryptedInput, ComputeError> {
        let n = self.encrypt_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(ComputeError::Http {
                status: 500,
                body: "input proof unavailable".to_string(),
            });
        }

        let handle = format!("0x{:064x}", 0xc0de_0000 + n);
        self.register(&handle, value);
        Ok(EncryptedInput {
            handle,
            proof: "0x01".to_string(),
        })
    }

    async fn request_verifiable_decryption(
        &self,
        handles: &[String],
        _target: &str,
    ) -> Result<DecryptionResult, ComputeError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_decrypt.load(Ordering::SeqCst) {
            return Err(ComputeError::InvalidResponse("missing proof".to_string()));
        }

        let values = self.values.lock().unwrap();
        let mut clear_values = HashMap::new();
        let mut encoded = String::from("0x");
        for handle in handles {
            let value = values.get(handle).copied().unwrap_or(0);
            encoded.push_str(&format!("{value:064x}"));
            if !self.omit_clear_values.load(Ordering::SeqCst) {
                clear_values.insert(handle.clone(), value);
            }
        }

        Ok(DecryptionResult {
            clear_values,
            abi_encoded_clear_values: encoded,
            decryption_proof: "0x02".to_string(),
        })
    }
}
