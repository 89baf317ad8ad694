// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Sync Poller
//!
//! Background task that periodically resyncs the record mirror so records
//! created or verified by other actors show up without an explicit refresh.
//!
//! Every `interval` the poller runs a full sync unless one is already in
//! progress. Sweeps while the session is not ready are skipped quietly.
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::PayrollService;
use crate::error::PayrollError;

pub struct SyncPoller {
    service: Arc<PayrollService>,
    interval: Duration,
}

impl SyncPoller {
    pub fn new(service: Arc<PayrollService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run until the cancellation token is triggered.
    ///
    /// The first sweep happens one interval after start.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Sync poller starting");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Sync poller shutting down");
                    return;
                }
            }

            self.poll_step().await;
        }
    }

    async fn poll_step(&self) {
        if self.service.activity().refreshing {
            debug!("Sync poller: refresh already in progress");
            return;
        }

        match self.service.sync_all().await {
            Ok(report) => {
                debug!(loaded = report.loaded, applied = report.applied, "Sync poller: synced");
            }
            Err(PayrollError::NotConnected) => {
                debug!("Sync poller: session not ready, skipping");
            }
            Err(e) => {
                warn!(error = %e, "Sync poller: sync failed");
            }
        }
    }
}
