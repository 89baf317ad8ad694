// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::payroll::PayrollService;

#[derive(Clone)]
pub struct AppState {
    pub payroll: Arc<PayrollService>,
}

impl AppState {
    pub fn new(payroll: Arc<PayrollService>) -> Self {
        Self { payroll }
    }
}
