// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounded operation log.
//!
//! A short human-readable trail of completed operations (syncs, creations,
//! decryptions), newest first. Entries are only ever dropped by capacity
//! eviction.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Maximum number of entries kept.
pub const OPERATION_LOG_CAPACITY: usize = 10;

/// A completed operation.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct OperationLogEntry {
    /// When the operation completed.
    pub at: DateTime<Utc>,
    /// Local wall-clock time of `at`, `HH:MM:SS`.
    pub local_time: String,
    pub description: String,
}

impl std::fmt::Display for OperationLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.local_time, self.description)
    }
}

/// Fixed-capacity, newest-first log.
#[derive(Default)]
pub struct OperationLog {
    entries: Mutex<VecDeque<OperationLogEntry>>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest when full.
    pub fn record(&self, description: impl Into<String>) {
        let at = Utc::now();
        let entry = OperationLogEntry {
            local_time: at.with_timezone(&Local).format("%H:%M:%S").to_string(),
            at,
            description: description.into(),
        };

        if let Ok(mut entries) = self.entries.lock() {
            entries.push_front(entry);
            entries.truncate(OPERATION_LOG_CAPACITY);
        }
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<OperationLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entry_comes_first() {
        let log = OperationLog::new();
        log.record("first");
        log.record("second");

        let entries = log.entries();
        assert_eq!(entries[0].description, "second");
        assert_eq!(entries[1].description, "first");
    }

    #[test]
    fn eleventh_entry_evicts_the_oldest() {
        let log = OperationLog::new();
        for i in 0..=OPERATION_LOG_CAPACITY {
            log.record(format!("op {i}"));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), OPERATION_LOG_CAPACITY);
        assert_eq!(entries[0].description, "op 10");
        assert!(entries.iter().all(|e| e.description != "op 0"));
    }

    #[test]
    fn entries_render_with_local_time() {
        let log = OperationLog::new();
        assert!(log.is_empty());
        log.record("Loaded 3 payroll records");

        let rendered = log.entries()[0].to_string();
        assert!(rendered.ends_with(": Loaded 3 payroll records"));
        assert_eq!(rendered.len(), "HH:MM:SS: ".len() + "Loaded 3 payroll records".len());
    }
}
