// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transient transaction status.
//!
//! There is a single status slot. Outcomes (success or error) fall back to
//! idle after a fixed delay; a newer status supersedes an older one along
//! with its pending expiry. Pending messages stay until the workflow that
//! raised them reports its outcome.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

/// How long workflow outcomes stay visible.
pub const OUTCOME_DISPLAY: Duration = Duration::from_secs(3);

/// How long availability probe results stay visible.
pub const PROBE_DISPLAY: Duration = Duration::from_secs(2);

/// Current transaction status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum TransactionStatus {
    Idle,
    Pending(String),
    Success(String),
    Error(String),
}

impl TransactionStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, TransactionStatus::Idle)
    }
}

struct Slot {
    status: TransactionStatus,
    /// Bumped on every update so stale expiries can be ignored
    generation: u64,
}

/// Holder of the single status slot.
#[derive(Clone)]
pub struct StatusBoard {
    slot: Arc<Mutex<Slot>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                status: TransactionStatus::Idle,
                generation: 0,
            })),
        }
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> TransactionStatus {
        self.slot
            .lock()
            .map(|slot| slot.status.clone())
            .unwrap_or(TransactionStatus::Idle)
    }

    /// Show a pending message until the next update.
    pub fn pending(&self, message: impl Into<String>) {
        self.replace(TransactionStatus::Pending(message.into()));
    }

    /// Show a success message that expires after `ttl`.
    pub fn success(&self, message: impl Into<String>, ttl: Duration) {
        let generation = self.replace(TransactionStatus::Success(message.into()));
        self.expire_after(generation, ttl);
    }

    /// Show an error message that expires after `ttl`.
    pub fn error(&self, message: impl Into<String>, ttl: Duration) {
        let generation = self.replace(TransactionStatus::Error(message.into()));
        self.expire_after(generation, ttl);
    }

    fn replace(&self, status: TransactionStatus) -> u64 {
        match self.slot.lock() {
            Ok(mut slot) => {
                slot.generation += 1;
                slot.status = status;
                slot.generation
            }
            Err(_) => 0,
        }
    }

    fn expire_after(&self, generation: u64, ttl: Duration) {
        // Outside a runtime there is nothing to schedule on; the status then
        // simply stays until superseded.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let slot = Arc::clone(&self.slot);
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Ok(mut slot) = slot.lock() {
                if slot.generation == generation {
                    slot.status = TransactionStatus::Idle;
                }
            }
        });
    }
}
