//! Incrementally maintained log statistics
//!
//! Counters are updated on every insert and evict so a snapshot never
//! requires rescanning the store. Level and source counts track entries
//! *currently retained*; `total_logs_processed` is cumulative.

use crate::types::{LogEntry, LogLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Mutable counters owned by the store, updated under its lock
#[derive(Debug, Clone)]
pub(crate) struct Stats {
    total_processed: u64,
    by_level: HashMap<LogLevel, u64>,
    by_source: HashMap<String, u64>,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self {
            total_processed: 0,
            by_level: LogLevel::ALL.iter().map(|l| (*l, 0)).collect(),
            by_source: HashMap::new(),
        }
    }

    pub(crate) fn record_insert(&mut self, entry: &LogEntry) {
        self.total_processed += 1;
        *self.by_level.entry(entry.level).or_insert(0) += 1;
        *self.by_source.entry(entry.source.clone()).or_insert(0) += 1;
    }

    /// Decrement counts for an evicted entry, clamping at zero and
    /// removing a source key once its count reaches zero
    pub(crate) fn record_evict(&mut self, entry: &LogEntry) {
        if let Some(count) = self.by_level.get_mut(&entry.level) {
            *count = count.saturating_sub(1);
        }
        if let Some(count) = self.by_source.get_mut(&entry.source) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.by_source.remove(&entry.source);
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Stats::new();
    }

    /// Point-in-time copy combined with the store's current bounds
    pub(crate) fn snapshot(
        &self,
        current_log_count: usize,
        oldest_log: Option<DateTime<Utc>>,
        newest_log: Option<DateTime<Utc>>,
    ) -> StatsSnapshot {
        StatsSnapshot {
            current_log_count,
            total_logs_processed: self.total_processed,
            logs_by_level: self.by_level.clone(),
            logs_by_source: self.by_source.clone(),
            oldest_log,
            newest_log,
        }
    }
}

/// A consistent point-in-time view of store statistics
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Entries currently retained
    pub current_log_count: usize,

    /// Cumulative insertions since construction or the last clear
    pub total_logs_processed: u64,

    /// Retained entry count per level (all levels always present)
    pub logs_by_level: HashMap<LogLevel, u64>,

    /// Retained entry count per source (zero-count sources omitted)
    pub logs_by_source: HashMap<String, u64>,

    /// Timestamp of the oldest retained entry, if any
    pub oldest_log: Option<DateTime<Utc>>,

    /// Timestamp of the newest retained entry, if any
    pub newest_log: Option<DateTime<Utc>>,
}
