//! Bounded, insertion-ordered log store with live fan-out
//!
//! `LogStore` is the aggregation core: it owns the bounded entry
//! sequence, the incrementally maintained statistics, and the subscriber
//! hub, and it wires them together — every mutation updates the counters
//! and pushes a full-state snapshot to live subscribers.
//!
//! One `RwLock` guards the entries, the id counter, and the statistics as
//! a unit: mutations hold the write guard for their full duration, and
//! every consistent read (listing, search, statistics, error scan) holds
//! the read guard, so scans never observe a half-applied mutation. The
//! hub's registry lock is independent; the broadcast payload is built
//! while the store guard is still held and delivered after release.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::hub::{Subscriber, SubscriberHub};
use crate::query::{ListQuery, SearchQuery};
use crate::stats::{Stats, StatsSnapshot};
use crate::types::{LogEntry, LogUpdate, Metadata, NewEntry};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

struct StoreInner {
    entries: VecDeque<LogEntry>,
    next_id: u64,
    stats: Stats,
}

/// Bounded in-memory log store with statistics and live subscribers
///
/// Explicitly constructed and owned — typically wrapped in an `Arc` and
/// shared with the transport layer. All operations take `&self`.
pub struct LogStore {
    inner: RwLock<StoreInner>,
    hub: SubscriberHub,
    max_logs: usize,
}

impl LogStore {
    /// Create a store with the default configuration
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    /// Create a store from an explicit configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                entries: VecDeque::new(),
                next_id: 1,
                stats: Stats::new(),
            }),
            hub: SubscriberHub::new(config.subscriber_buffer),
            max_logs: config.max_logs,
        }
    }

    /// Append a new entry built from the given fields
    ///
    /// Never fails: the level is normalized case-insensitively (unknown
    /// levels become `INFO`) and the timestamp is the insertion instant.
    /// Returns the entry as stored, with its assigned id.
    pub async fn append(
        &self,
        level: &str,
        message: impl Into<String>,
        source: impl Into<String>,
        metadata: Metadata,
    ) -> LogEntry {
        self.append_record(
            NewEntry::new()
                .level(level)
                .message(message)
                .source(source)
                .metadata(metadata),
        )
        .await
    }

    /// Append an entry from a wire record, defaulting any missing fields
    pub async fn append_record(&self, record: NewEntry) -> LogEntry {
        let (entry, update) = {
            let mut inner = self.inner.write().await;

            let entry = record.into_entry(inner.next_id);
            inner.next_id += 1;
            inner.stats.record_insert(&entry);
            inner.entries.push_back(entry.clone());

            // At most one eviction per insertion
            if inner.entries.len() > self.max_logs {
                if let Some(evicted) = inner.entries.pop_front() {
                    inner.stats.record_evict(&evicted);
                    tracing::debug!(id = evicted.id, "Evicted oldest entry at capacity");
                }
            }

            tracing::debug!(
                id = entry.id,
                level = %entry.level,
                source = %entry.source,
                "Log entry appended"
            );

            (entry, self.pending_update(&inner).await)
        };

        if let Some(update) = update {
            self.hub.broadcast(update).await;
        }
        entry
    }

    /// Remove all entries, resetting the id counter and statistics
    ///
    /// Returns the number of entries removed.
    pub async fn clear(&self) -> usize {
        let (count, update) = {
            let mut inner = self.inner.write().await;
            let count = inner.entries.len();
            inner.entries.clear();
            inner.next_id = 1;
            inner.stats.reset();
            tracing::info!(cleared = count, "Log store cleared");

            (count, self.pending_update(&inner).await)
        };

        if let Some(update) = update {
            self.hub.broadcast(update).await;
        }
        count
    }

    /// Current number of retained entries
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Snapshot of all retained entries in insertion order
    pub async fn entries(&self) -> Vec<LogEntry> {
        let inner = self.inner.read().await;
        inner.entries.iter().cloned().collect()
    }

    /// List entries matching the query over a consistent snapshot
    pub async fn list(&self, query: &ListQuery) -> Vec<LogEntry> {
        let inner = self.inner.read().await;
        query.apply(inner.entries.iter())
    }

    /// Search entry text fields over a consistent snapshot
    pub async fn search(&self, query: &SearchQuery) -> Vec<LogEntry> {
        let inner = self.inner.read().await;
        query.apply(inner.entries.iter())
    }

    /// Consistent point-in-time statistics
    pub async fn statistics(&self) -> StatsSnapshot {
        let inner = self.inner.read().await;
        inner.stats.snapshot(
            inner.entries.len(),
            inner.entries.front().map(|e| e.timestamp),
            inner.entries.back().map(|e| e.timestamp),
        )
    }

    /// Error and critical entries within the lookback window, newest first
    ///
    /// Scans from the newest entry backwards and stops at the first entry
    /// older than `now - lookback`. The early exit assumes timestamps are
    /// non-decreasing in insertion order, which holds for insertion-time
    /// stamps; producer-supplied out-of-order timestamps can hide older
    /// errors behind the first out-of-window entry. Kept deliberately:
    /// the early exit is what bounds the scan under normal operation.
    pub async fn recent_errors(&self, lookback: Duration, limit: usize) -> Vec<LogEntry> {
        let lookback = TimeDelta::from_std(lookback).unwrap_or(TimeDelta::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let inner = self.inner.read().await;
        let mut errors = Vec::new();
        for entry in inner.entries.iter().rev() {
            if entry.timestamp < cutoff {
                break;
            }
            if entry.is_error() {
                errors.push(entry.clone());
            }
            if errors.len() >= limit {
                break;
            }
        }
        errors
    }

    /// Register a live subscriber for full-state updates
    pub async fn subscribe(&self) -> Subscriber {
        self.hub.subscribe().await
    }

    /// Remove a live subscriber by token (idempotent)
    pub async fn unsubscribe(&self, token: u64) {
        self.hub.unsubscribe(token).await;
    }

    /// Number of live subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count().await
    }

    /// Full-state update payload for the current store content
    ///
    /// Streaming adapters use this for the initial event sent to a
    /// freshly connected subscriber.
    pub async fn update_payload(&self) -> LogUpdate {
        let inner = self.inner.read().await;
        Self::payload_from(&inner)
    }

    /// Build the broadcast payload only if anyone is listening
    async fn pending_update(&self, inner: &StoreInner) -> Option<LogUpdate> {
        if self.hub.has_subscribers().await {
            Some(Self::payload_from(inner))
        } else {
            None
        }
    }

    fn payload_from(inner: &StoreInner) -> LogUpdate {
        LogUpdate {
            success: true,
            count: inner.entries.len(),
            logs: inner.entries.iter().rev().cloned().collect(),
        }
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}
