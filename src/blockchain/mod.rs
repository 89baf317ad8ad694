// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration for the EVM payroll contract.
//!
//! This module provides:
//! - The [`Ledger`] collaborator trait used by the payroll workflows
//! - An `alloy` binding of the payroll contract
//! - Operator signer loading

pub mod client;
pub mod contract;
pub mod ledger;
pub mod signing;
pub mod types;

pub use client::PayrollLedgerClient;
pub use ledger::{Ledger, LedgerError};
pub use types::*;
