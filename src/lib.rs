// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential Payroll - Encrypted Salary Orchestration Service
//!
//! Payroll records live on an EVM contract with hours and performance in
//! clear text and the salary as an FHE ciphertext. Salaries are revealed
//! only through a verifiable decryption whose proof the contract checks.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Payroll contract binding and the `Ledger` trait
//! - `compute` - Confidential-compute relayer client
//! - `payroll` - Session, record store and the create/decrypt workflows

pub mod api;
pub mod blockchain;
pub mod compute;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
pub mod state;
pub mod telemetry;
