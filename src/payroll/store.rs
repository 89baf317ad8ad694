// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory mirror of the ledger's payroll records.
//!
//! ## Sync Contract
//!
//! 1. Fetch every record id from the ledger.
//! 2. Fetch each record body; a failing record is logged and skipped.
//! 3. Replace the whole set at once; results are never merged.
//!
//! Every sync takes a ticket from a monotonic counter. A sync that finishes
//! after a later-started sync has already been applied discards its result,
//! so overlapping syncs cannot regress the mirror.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::blockchain::Ledger;
use crate::error::PayrollError;
use crate::models::PayrollRecord;

/// Outcome of one sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SyncReport {
    /// Records fetched successfully.
    pub loaded: usize,
    /// Ids whose fetch failed.
    pub skipped: Vec<String>,
    /// False when a newer sync had already been applied.
    pub applied: bool,
}

#[derive(Default)]
struct Snapshot {
    /// Records in ledger order
    records: Vec<PayrollRecord>,
    index: HashMap<String, usize>,
    /// Ticket of the sync that produced this snapshot
    sync_ticket: u64,
}

#[derive(Default)]
pub struct RecordStore {
    snapshot: RwLock<Snapshot>,
    next_ticket: AtomicU64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in ledger order.
    pub async fn snapshot(&self) -> Vec<PayrollRecord> {
        self.snapshot.read().await.records.clone()
    }

    pub async fn get(&self, id: &str) -> Option<PayrollRecord> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .index
            .get(id)
            .and_then(|&i| snapshot.records.get(i))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Refresh the whole mirror from the ledger.
    ///
    /// Only fails when the id list itself cannot be fetched.
    pub async fn sync_from(&self, ledger: &dyn Ledger) -> Result<SyncReport, PayrollError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let ids = ledger.all_record_ids().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to list payroll record ids");
            PayrollError::ServiceUnavailable(e.to_string())
        })?;

        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();

        for id in ids {
            match ledger.record(&id).await {
                Ok(body) => records.push(PayrollRecord::from_ledger(id, body)),
                Err(e) => {
                    let failure = PayrollError::SyncPartialFailure {
                        id: id.clone(),
                        reason: e.to_string(),
                    };
                    tracing::warn!(record_id = %id, error = %failure, "Skipping payroll record");
                    skipped.push(id);
                }
            }
        }

        let loaded = records.len();
        let applied = self.replace(ticket, records).await;
        if !applied {
            tracing::debug!(ticket, "Discarding stale sync result");
        }

        Ok(SyncReport {
            loaded,
            skipped,
            applied,
        })
    }

    async fn replace(&self, ticket: u64, records: Vec<PayrollRecord>) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if ticket < snapshot.sync_ticket {
            return false;
        }

        snapshot.index = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.id.clone(), i))
            .collect();
        snapshot.records = records;
        snapshot.sync_ticket = ticket;
        true
    }
}
