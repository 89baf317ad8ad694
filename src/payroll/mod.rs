// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Payroll Orchestration
//!
//! Coordinates the ledger and the confidential-compute service:
//!
//! - [`session`]: signing identity and compute readiness
//! - [`store`]: in-memory mirror of the ledger's records
//! - [`create`] / [`decrypt`]: the two mutating workflows
//! - [`stats`], [`history`], [`status`]: derived views and user feedback
//! - [`poller`]: optional periodic resync
//!
//! Everything is reached through [`PayrollService`].

pub mod create;
pub mod decrypt;
pub mod history;
pub mod poller;
pub mod service;
pub mod session;
pub mod stats;
pub mod status;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use create::CreatedPayroll;
pub use decrypt::{DecryptOutcome, VerificationSource};
pub use history::OperationLogEntry;
pub use poller::SyncPoller;
pub use service::{Activity, PayrollService, WorkflowSettings};
pub use session::SessionState;
pub use stats::PayrollStats;
pub use status::TransactionStatus;
pub use store::SyncReport;
