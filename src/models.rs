// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Payroll Data Models
//!
//! Domain records shared by the workflows, the record store and the HTTP
//! API. All public types derive `Serialize` and `ToSchema` so they can be
//! returned directly from handlers.
//!
//! ## Boundary Coercion
//!
//! Numeric input arrives as free-form text (from API callers) or as wide
//! integers (from the ledger). Both are coerced here with a default of `0`
//! so the rest of the crate only ever sees well-formed values.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Identifies the signing identity of the session and the creator of a
/// record. Format: `0x` followed by 40 hexadecimal characters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Payroll Record
// =============================================================================

/// Description stored with every record created by this service.
pub const DEFAULT_RECORD_DESCRIPTION: &str = "Encrypted Payroll Record";

/// Prefix of ledger record ids minted by the create workflow.
pub const RECORD_ID_PREFIX: &str = "payroll-";

/// A payroll entry mirrored from the ledger.
///
/// The salary is never held in clear text unless the record has been
/// verified on-chain, in which case `decrypted_value` carries the value that
/// was proven.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PayrollRecord {
    /// Ledger record id (e.g. `payroll-1718000000000`).
    pub id: String,
    /// Employee display name (public).
    pub employee_name: String,
    /// Opaque reference to the encrypted salary. Equal to `id` in the
    /// current contract binding.
    pub encrypted_salary_handle: String,
    /// Hours worked (public).
    pub public_hours: u64,
    /// Performance score (public).
    pub public_performance: u64,
    pub description: String,
    /// Ledger creation time, unix seconds.
    pub timestamp: u64,
    /// Address that created the record.
    pub creator: String,
    /// Whether a decryption proof has been recorded on-chain.
    pub verified: bool,
    /// Proven salary value. Only present when `verified` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrypted_value: Option<u64>,
}

/// Record body as returned by the ledger, before it is keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub name: String,
    pub public_hours: u64,
    pub public_performance: u64,
    pub description: String,
    pub timestamp: u64,
    pub creator: String,
    pub verified: bool,
    pub decrypted_value: u64,
}

impl PayrollRecord {
    /// Build a record from its ledger body.
    ///
    /// The decrypted value is dropped unless the record is verified.
    pub fn from_ledger(id: impl Into<String>, body: LedgerRecord) -> Self {
        let id = id.into();
        Self {
            encrypted_salary_handle: id.clone(),
            id,
            employee_name: body.name,
            public_hours: body.public_hours,
            public_performance: body.public_performance,
            description: body.description,
            timestamp: body.timestamp,
            creator: body.creator,
            verified: body.verified,
            decrypted_value: body.verified.then_some(body.decrypted_value),
        }
    }
}

// =============================================================================
// Create Request
// =============================================================================

/// Request body for creating a payroll record.
///
/// Numeric fields are accepted as text and parsed with a default of zero,
/// mirroring what a form submission would carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePayrollRequest {
    pub employee_name: String,
    /// Salary amount; non-digit characters are stripped before parsing.
    pub salary: String,
    pub hours: String,
    pub performance: String,
}

/// Validated, coerced create input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollInput {
    pub employee_name: String,
    pub salary: u64,
    pub hours: u64,
    pub performance: u64,
}

/// Rejected create input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("employee name is required")]
    BlankName,

    #[error("salary {0} exceeds the encrypted 32-bit range")]
    SalaryOutOfRange(String),
}

/// Largest salary the contract's encrypted integer can hold.
pub const MAX_SALARY: u64 = u32::MAX as u64;

impl CreatePayrollRequest {
    /// Coerce the raw request into numeric input.
    ///
    /// A salary without digits is `0`; one beyond [`MAX_SALARY`] is
    /// rejected, however many digits it has.
    pub fn parse(&self) -> Result<PayrollInput, InputError> {
        let employee_name = self.employee_name.trim();
        if employee_name.is_empty() {
            return Err(InputError::BlankName);
        }

        let salary_digits: String = self.salary.chars().filter(|c| c.is_ascii_digit()).collect();
        let salary = if salary_digits.is_empty() {
            0
        } else {
            // Only overflow can fail here: the string is all ASCII digits.
            salary_digits
                .parse::<u64>()
                .ok()
                .filter(|&salary| salary <= MAX_SALARY)
                .ok_or(InputError::SalaryOutOfRange(salary_digits))?
        };

        Ok(PayrollInput {
            employee_name: employee_name.to_string(),
            salary,
            hours: parse_or_zero(&self.hours),
            performance: parse_or_zero(&self.performance),
        })
    }
}

/// Parse a non-negative integer from free-form text, defaulting to `0`.
///
/// Leading digits are honoured the way a lenient integer parser would
/// (`"160h"` → `160`); anything without a leading digit yields `0`.
pub fn parse_or_zero(raw: &str) -> u64 {
    let trimmed = raw.trim();
    let digits: &str = {
        let end = trimmed
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    digits.parse().unwrap_or(0)
}

/// Mint a record id from a creation time in unix milliseconds.
pub fn record_id_at(unix_millis: i64) -> String {
    format!("{RECORD_ID_PREFIX}{unix_millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(verified: bool, decrypted_value: u64) -> LedgerRecord {
        LedgerRecord {
            name: "Alice".to_string(),
            public_hours: 160,
            public_performance: 8,
            description: DEFAULT_RECORD_DESCRIPTION.to_string(),
            timestamp: 1_718_000_000,
            creator: "0x1111111111111111111111111111111111111111".to_string(),
            verified,
            decrypted_value,
        }
    }

    #[test]
    fn parse_or_zero_is_lenient() {
        assert_eq!(parse_or_zero("160"), 160);
        assert_eq!(parse_or_zero(" 42 "), 42);
        assert_eq!(parse_or_zero("8.5"), 8);
        assert_eq!(parse_or_zero("160h"), 160);
        assert_eq!(parse_or_zero(""), 0);
        assert_eq!(parse_or_zero("abc"), 0);
        assert_eq!(parse_or_zero("-5"), 0);
    }

    #[test]
    fn parse_request_strips_salary_formatting() {
        let request = CreatePayrollRequest {
            employee_name: "  Alice ".to_string(),
            salary: "150,000".to_string(),
            hours: "160".to_string(),
            performance: "eight".to_string(),
        };

        let input = request.parse().unwrap();
        assert_eq!(input.employee_name, "Alice");
        assert_eq!(input.salary, 150_000);
        assert_eq!(input.hours, 160);
        assert_eq!(input.performance, 0);
    }

    #[test]
    fn parse_request_rejects_blank_name() {
        let request = CreatePayrollRequest {
            employee_name: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(request.parse(), Err(InputError::BlankName));
    }

    #[test]
    fn parse_request_rejects_out_of_range_salary() {
        for salary in ["5000000000", "99999999999999999999999", "1,000,000,000,000,000,000,000"] {
            let request = CreatePayrollRequest {
                employee_name: "Alice".to_string(),
                salary: salary.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(request.parse(), Err(InputError::SalaryOutOfRange(_))),
                "salary {salary} accepted"
            );
        }
    }

    #[test]
    fn parse_request_accepts_salary_at_limit_and_empty_salary() {
        let at_limit = CreatePayrollRequest {
            employee_name: "Alice".to_string(),
            salary: "4294967295".to_string(),
            ..Default::default()
        };
        assert_eq!(at_limit.parse().unwrap().salary, MAX_SALARY);

        let empty = CreatePayrollRequest {
            employee_name: "Alice".to_string(),
            salary: "n/a".to_string(),
            ..Default::default()
        };
        assert_eq!(empty.parse().unwrap().salary, 0);
    }

    #[test]
    fn unverified_record_hides_decrypted_value() {
        let record = PayrollRecord::from_ledger("payroll-1", body(false, 999));
        assert!(!record.verified);
        assert_eq!(record.decrypted_value, None);
        assert_eq!(record.encrypted_salary_handle, "payroll-1");
    }

    #[test]
    fn verified_record_keeps_decrypted_value() {
        let record = PayrollRecord::from_ledger("payroll-2", body(true, 150_000));
        assert_eq!(record.decrypted_value, Some(150_000));
    }

    #[test]
    fn record_ids_use_prefix() {
        assert_eq!(record_id_at(1_718_000_000_123), "payroll-1718000000123");
    }
}
