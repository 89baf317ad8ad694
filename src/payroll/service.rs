// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The payroll service: collaborators plus the shared state every workflow
//! reads and reports into.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

use super::history::{OperationLog, OperationLogEntry};
use super::session::{SessionController, SessionState};
use super::stats::{compute_stats, performance_distribution, PayrollStats, MAX_PERFORMANCE_SCORE};
use super::status::{StatusBoard, TransactionStatus, OUTCOME_DISPLAY, PROBE_DISPLAY};
use super::store::{RecordStore, SyncReport};
use crate::blockchain::{Ledger, SendResult, TxReceipt};
use crate::compute::ConfidentialCompute;
use crate::error::PayrollError;
use crate::models::{record_id_at, PayrollRecord, WalletAddress};

/// Default upper bound on waiting for a transaction receipt.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Message shown when a workflow runs without a ready session.
pub(super) const NOT_CONNECTED_MESSAGE: &str = "Please connect wallet first";

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// How long to wait for a submitted transaction to be mined.
    pub confirmation_timeout: Duration,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

/// Advisory in-progress flags.
///
/// They let a trigger layer refuse duplicate requests; they do not exclude
/// concurrent programmatic calls. Each flag counts running workflows and is
/// raised while the count is non-zero.
#[derive(Default)]
pub struct ActivityFlags {
    creating: AtomicUsize,
    refreshing: AtomicUsize,
    decrypting: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Activity {
    pub creating: bool,
    pub refreshing: bool,
    pub decrypting: bool,
}

impl ActivityFlags {
    pub fn snapshot(&self) -> Activity {
        Activity {
            creating: self.creating.load(Ordering::SeqCst) > 0,
            refreshing: self.refreshing.load(Ordering::SeqCst) > 0,
            decrypting: self.decrypting.load(Ordering::SeqCst) > 0,
        }
    }

    pub(super) fn creating(&self) -> FlagGuard<'_> {
        FlagGuard::raise(&self.creating)
    }

    pub(super) fn refreshing(&self) -> FlagGuard<'_> {
        FlagGuard::raise(&self.refreshing)
    }

    pub(super) fn decrypting(&self) -> FlagGuard<'_> {
        FlagGuard::raise(&self.decrypting)
    }
}

/// Releases its share of a flag when dropped.
pub(super) struct FlagGuard<'a>(&'a AtomicUsize);

impl<'a> FlagGuard<'a> {
    fn raise(flag: &'a AtomicUsize) -> Self {
        flag.fetch_add(1, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Orchestrates the ledger, the compute service and the local mirror.
pub struct PayrollService {
    pub(super) ledger: Arc<dyn Ledger>,
    pub(super) compute: Arc<dyn ConfidentialCompute>,
    /// Contract address; scopes encryption and decryption requests
    pub(super) target: String,
    pub(super) settings: WorkflowSettings,
    pub(super) session: SessionController,
    pub(super) store: RecordStore,
    pub(super) log: OperationLog,
    pub(super) status: StatusBoard,
    pub(super) activity: ActivityFlags,
    last_id_millis: AtomicI64,
}

impl PayrollService {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        compute: Arc<dyn ConfidentialCompute>,
        target: impl Into<String>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            ledger,
            compute,
            target: target.into(),
            settings,
            session: SessionController::new(),
            store: RecordStore::new(),
            log: OperationLog::new(),
            status: StatusBoard::new(),
            activity: ActivityFlags::default(),
            last_id_millis: AtomicI64::new(0),
        }
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    pub async fn connect(&self, identity: WalletAddress) {
        tracing::info!(identity = %identity, "Session connected");
        self.session.connect(identity).await;
    }

    pub async fn disconnect(&self) {
        tracing::info!("Session disconnected");
        self.session.disconnect().await;
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.state().await
    }

    /// Initialize the compute service if needed, surfacing failures in the
    /// transient status.
    pub async fn ensure_ready(&self) -> Result<SessionState, PayrollError> {
        if let Err(e) = self.session.ensure_ready(self.compute.as_ref()).await {
            if matches!(e, PayrollError::InitializationFailed(_)) {
                self.status
                    .error("Confidential compute initialization failed", OUTCOME_DISPLAY);
            }
            return Err(e);
        }
        Ok(self.session.state().await)
    }

    // -------------------------------------------------------------------------
    // Record store
    // -------------------------------------------------------------------------

    /// Resync the whole record mirror from the ledger.
    pub async fn sync_all(&self) -> Result<SyncReport, PayrollError> {
        self.session.require_ready().await?;
        let _refreshing = self.activity.refreshing();

        match self.store.sync_from(self.ledger.as_ref()).await {
            Ok(report) => {
                if report.applied {
                    tracing::info!(
                        loaded = report.loaded,
                        skipped = report.skipped.len(),
                        "Payroll records synced"
                    );
                    self.log
                        .record(format!("Loaded {} payroll records", report.loaded));
                }
                Ok(report)
            }
            Err(e) => {
                self.status.error("Failed to load data", OUTCOME_DISPLAY);
                Err(e)
            }
        }
    }

    /// Resync after a mutation. The mutation already succeeded, so a failed
    /// refresh is only logged.
    pub(super) async fn resync_after_mutation(&self) {
        if let Err(e) = self.sync_all().await {
            tracing::warn!(error = %e, "Resync after ledger mutation failed");
        }
    }

    pub async fn records(&self) -> Vec<PayrollRecord> {
        self.store.snapshot().await
    }

    pub async fn record(&self, id: &str) -> Option<PayrollRecord> {
        self.store.get(id).await
    }

    // -------------------------------------------------------------------------
    // Derived views
    // -------------------------------------------------------------------------

    /// Statistics over the current snapshot, computed fresh on every call.
    pub async fn stats(&self) -> PayrollStats {
        compute_stats(&self.store.snapshot().await)
    }

    pub async fn performance_distribution(&self) -> [u32; MAX_PERFORMANCE_SCORE] {
        performance_distribution(&self.store.snapshot().await)
    }

    pub fn history(&self) -> Vec<OperationLogEntry> {
        self.log.entries()
    }

    pub fn status(&self) -> TransactionStatus {
        self.status.current()
    }

    pub fn activity(&self) -> Activity {
        self.activity.snapshot()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    // -------------------------------------------------------------------------
    // Availability probe
    // -------------------------------------------------------------------------

    /// Ask the ledger whether the contract is ready. Needs no identity.
    pub async fn check_availability(&self) -> Result<bool, PayrollError> {
        match self.ledger.is_available().await {
            Ok(true) => {
                self.status
                    .success("Contract is available and ready", PROBE_DISPLAY);
                self.log.record("Checked contract availability - Ready");
                Ok(true)
            }
            Ok(false) => {
                self.status.error("Ledger reported unavailable", PROBE_DISPLAY);
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Availability check failed");
                self.status.error("Availability check failed", PROBE_DISPLAY);
                Err(PayrollError::ServiceUnavailable(e.to_string()))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Shared workflow helpers
    // -------------------------------------------------------------------------

    /// Mint a record id from the current time, strictly increasing within
    /// this process.
    pub(super) fn next_record_id(&self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last_id_millis.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self.last_id_millis.compare_exchange(
                last,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return record_id_at(next),
                Err(current) => last = current,
            }
        }
    }

    /// Wait, within the configured bound, for a submitted transaction's
    /// receipt. Reverted receipts are returned as-is.
    pub(super) async fn await_receipt(&self, sent: &SendResult) -> Result<TxReceipt, PayrollError> {
        let timeout = self.settings.confirmation_timeout;
        match tokio::time::timeout(timeout, self.ledger.wait_for_confirmation(&sent.tx_hash)).await
        {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => Err(PayrollError::from_submission(e)),
            Err(_) => {
                tracing::warn!(tx_hash = %sent.tx_hash, timeout_secs = timeout.as_secs(), "Confirmation timed out");
                Err(PayrollError::SubmissionFailed(format!(
                    "confirmation of {} timed out after {}s",
                    sent.tx_hash,
                    timeout.as_secs()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::test_support::{ready_service, sample_record, service_with};

    #[tokio::test]
    async fn sync_requires_ready_session() {
        let (service, ledger, _) = service_with(Default::default());
        ledger.seed("payroll-1", sample_record("Alice", 160, 8));

        assert_eq!(service.sync_all().await, Err(PayrollError::NotConnected));
        assert!(service.records().await.is_empty());
    }

    #[tokio::test]
    async fn sync_logs_loaded_count() {
        let (service, ledger, _) = ready_service().await;
        ledger.seed("payroll-1", sample_record("Alice", 160, 8));
        ledger.seed("payroll-2", sample_record("Bob", 100, 5));
        ledger.seed("payroll-3", sample_record("Carol", 80, 7));
        ledger.fail_reads_for("payroll-2");

        let report = service.sync_all().await.unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(service.records().await.len(), 2);
        assert_eq!(service.history()[0].description, "Loaded 2 payroll records");
        assert!(!service.activity().refreshing);
    }

    #[tokio::test]
    async fn failed_id_listing_sets_error_status() {
        let (service, ledger, _) = ready_service().await;
        ledger.fail_id_listing(true);

        let result = service.sync_all().await;
        assert!(matches!(result, Err(PayrollError::ServiceUnavailable(_))));
        assert_eq!(
            service.status(),
            TransactionStatus::Error("Failed to load data".to_string())
        );
    }

    #[tokio::test]
    async fn stats_follow_latest_sync() {
        let (service, ledger, _) = ready_service().await;
        ledger.seed("payroll-1", sample_record("Alice", 160, 4));
        service.sync_all().await.unwrap();
        assert_eq!(service.stats().await.total_hours, 160);

        ledger.seed("payroll-2", sample_record("Bob", 40, 8));
        service.sync_all().await.unwrap();

        let stats = service.stats().await;
        assert_eq!(stats.total_payments, 2);
        assert_eq!(stats.total_hours, 200);
        assert_eq!(stats.avg_performance, 6.0);
        assert_eq!(service.performance_distribution().await[7], 1);
    }

    #[tokio::test]
    async fn initialization_failure_is_surfaced() {
        let (service, _, compute) = service_with(Default::default());
        compute.fail_initialize(true);
        service
            .connect(WalletAddress::from("0x1111111111111111111111111111111111111111"))
            .await;

        let result = service.ensure_ready().await;
        assert!(matches!(result, Err(PayrollError::InitializationFailed(_))));
        assert_eq!(
            service.status(),
            TransactionStatus::Error("Confidential compute initialization failed".to_string())
        );

        let state = service.session_state().await;
        assert!(state.connected && !state.compute_ready && !state.initializing);
    }

    #[tokio::test]
    async fn availability_probe_reports_and_logs() {
        let (service, ledger, _) = service_with(Default::default());

        assert_eq!(service.check_availability().await, Ok(true));
        assert_eq!(
            service.status(),
            TransactionStatus::Success("Contract is available and ready".to_string())
        );
        assert_eq!(
            service.history()[0].description,
            "Checked contract availability - Ready"
        );

        ledger.set_available(false);
        assert_eq!(service.check_availability().await, Ok(false));
        assert!(matches!(service.status(), TransactionStatus::Error(_)));
        assert_eq!(service.history().len(), 1);
    }

    #[test]
    fn overlapping_runs_keep_flag_raised() {
        let flags = ActivityFlags::default();

        let first = flags.refreshing();
        let second = flags.refreshing();
        drop(first);
        assert!(flags.snapshot().refreshing);

        drop(second);
        assert!(!flags.snapshot().refreshing);
        assert!(!flags.snapshot().creating);
    }

    #[tokio::test]
    async fn record_ids_are_unique_and_increasing() {
        let (service, _, _) = service_with(Default::default());
        let ids: Vec<String> = (0..50).map(|_| service.next_record_id()).collect();

        let millis: Vec<i64> = ids
            .iter()
            .map(|id| id.trim_start_matches("payroll-").parse().unwrap())
            .collect();
        assert!(millis.windows(2).all(|w| w[0] < w[1]));
    }
}
