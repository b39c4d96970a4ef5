//! # loghub
//!
//! Bounded in-memory log aggregation with filtered queries and live
//! subscriber fan-out.
//!
//! ## Overview
//!
//! `loghub` is the core of an in-process log aggregation service: a
//! transport layer (HTTP, SSE, anything) pushes structured entries in,
//! the store retains a bounded, insertion-ordered buffer of them, and
//! consumers list, filter, search, and receive a live push feed of the
//! full store state after every mutation.
//!
//! ## Quick Start
//!
//! ```rust
//! use loghub::{ListQuery, LogStore, SearchQuery};
//!
//! # async fn example() {
//! let store = LogStore::new();
//!
//! // Intake never fails — unknown levels and missing fields default
//! let entry = store
//!     .append("error", "disk quota exceeded", "worker-3", serde_json::Map::new())
//!     .await;
//! println!("stored entry {}", entry.id);
//!
//! // Filtered listing over a consistent snapshot, newest first
//! let errors = store.list(&ListQuery::new().level("error").limit(50)).await;
//!
//! // Substring search across message, source, and metadata
//! let hits = store.search(&SearchQuery::new("quota")).await;
//!
//! // Live feed: every mutation pushes the full store state
//! let mut feed = store.subscribe().await;
//! store.append("info", "job done", "worker-3", serde_json::Map::new()).await;
//! let update = feed.recv().await.unwrap();
//! assert_eq!(update.count, store.len().await);
//! # let _ = (errors, hits);
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **[`LogStore`]** — bounded ordered store, the single mutation path;
//!   owns the statistics and the subscriber hub
//! - **[`ListQuery`] / [`SearchQuery`]** — filter predicates applied
//!   under the store's read guard
//! - **[`SubscriberHub`] / [`Subscriber`]** — best-effort fan-out of
//!   full-state [`LogUpdate`] messages; slow consumers are dropped,
//!   producers never block
//! - **[`StatsSnapshot`]** — incrementally maintained counts by level
//!   and source, always consistent with store content

pub mod config;
pub mod error;
pub mod hub;
pub mod query;
pub mod stats;
pub mod store;
pub mod types;

// Re-export core types
pub use config::StoreConfig;
pub use error::{LogError, Result};
pub use hub::{Subscriber, SubscriberHub};
pub use query::{ListQuery, SearchQuery, SortOrder};
pub use stats::StatsSnapshot;
pub use store::LogStore;
pub use types::{LogEntry, LogLevel, LogUpdate, Metadata, NewEntry};
