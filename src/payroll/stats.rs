// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Aggregate statistics over a record snapshot.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::PayrollRecord;

/// Highest performance score counted by the distribution.
pub const MAX_PERFORMANCE_SCORE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollStats {
    pub total_payments: usize,
    pub verified_payments: usize,
    /// Mean public performance over all records, `0` when there are none.
    pub avg_performance: f64,
    /// Exact sum of public hours; ledger values are arbitrary `u64`s, so
    /// the total is widened.
    pub total_hours: u128,
}

pub fn compute_stats(records: &[PayrollRecord]) -> PayrollStats {
    let total_payments = records.len();
    let verified_payments = records.iter().filter(|r| r.verified).count();
    let avg_performance = if records.is_empty() {
        0.0
    } else {
        let sum: u128 = records.iter().map(|r| u128::from(r.public_performance)).sum();
        sum as f64 / total_payments as f64
    };
    let total_hours = records.iter().map(|r| u128::from(r.public_hours)).sum();

    PayrollStats {
        total_payments,
        verified_payments,
        avg_performance,
        total_hours,
    }
}

/// Count of records per performance score `1..=10`; index `i` holds score
/// `i + 1`. Scores outside that range are not counted.
pub fn performance_distribution(records: &[PayrollRecord]) -> [u32; MAX_PERFORMANCE_SCORE] {
    let mut buckets = [0u32; MAX_PERFORMANCE_SCORE];
    for record in records {
        let score = record.public_performance as usize;
        if (1..=MAX_PERFORMANCE_SCORE).contains(&score) {
            buckets[score - 1] += 1;
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LedgerRecord;

    fn record(hours: u64, performance: u64, verified: bool) -> PayrollRecord {
        PayrollRecord::from_ledger(
            format!("payroll-{hours}-{performance}"),
            LedgerRecord {
                name: "Emp".to_string(),
                public_hours: hours,
                public_performance: performance,
                description: String::new(),
                timestamp: 0,
                creator: String::new(),
                verified,
                decrypted_value: 1,
            },
        )
    }

    #[test]
    fn empty_snapshot_has_zero_average() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_payments, 0);
        assert_eq!(stats.avg_performance, 0.0);
        assert_eq!(stats.total_hours, 0);
    }

    #[test]
    fn average_performance_is_arithmetic_mean() {
        let stats = compute_stats(&[record(10, 4, false), record(20, 8, true)]);
        assert_eq!(stats.avg_performance, 6.0);
        assert_eq!(stats.verified_payments, 1);
    }

    #[test]
    fn total_hours_includes_unverified_records() {
        let records = [record(160, 8, false), record(120, 6, false), record(40, 9, true)];
        let stats = compute_stats(&records);
        assert_eq!(stats.total_hours, 320);
        assert_eq!(stats.total_payments, 3);
    }

    #[test]
    fn sums_do_not_overflow_on_extreme_ledger_values() {
        let half = u64::MAX / 2 + 1;
        let stats = compute_stats(&[record(half, half, false), record(half, half, false)]);
        assert_eq!(stats.total_hours, 2 * u128::from(half));
        assert_eq!(stats.avg_performance, half as f64);
    }

    #[test]
    fn distribution_ignores_out_of_range_scores() {
        let records = [
            record(1, 1, false),
            record(2, 10, false),
            record(3, 10, true),
            record(4, 0, false),
            record(5, 11, false),
        ];
        let buckets = performance_distribution(&records);
        assert_eq!(buckets[0], 1);
        assert_eq!(buckets[9], 2);
        assert_eq!(buckets.iter().sum::<u32>(), 3);
    }
}
