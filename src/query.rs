//! Filtered listing and text search over store snapshots
//!
//! Queries are plain predicate bundles; the store applies them while
//! holding its read guard so a scan never observes a concurrent mutation.
//!
//! Level filters compare against the normalized upper-case level name, so
//! a filter string that is not a recognized level matches nothing (it is
//! not coerced to `INFO` the way entry levels are on intake).

use crate::types::LogEntry;
use chrono::{DateTime, Utc};

/// Result ordering for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent entries first (the default)
    #[default]
    NewestFirst,
    /// Oldest entries first
    OldestFirst,
}

/// Filter criteria for [`LogStore::list`](crate::LogStore::list)
///
/// All criteria are optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    level: Option<String>,
    source: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<usize>,
    order: SortOrder,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact level match, case-insensitive on the input text
    pub fn level(mut self, level: impl AsRef<str>) -> Self {
        self.level = Some(level.as_ref().to_ascii_uppercase());
        self
    }

    /// Case-insensitive substring match on the source
    pub fn source(mut self, substring: impl Into<String>) -> Self {
        self.source = Some(substring.into());
        self
    }

    /// Keep entries with `timestamp >= start` (inclusive)
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Keep entries with `timestamp <= end` (inclusive)
    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Truncate the sorted result to at most `limit` entries
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = &self.level {
            if entry.level.as_str() != level {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if !entry
                .source
                .to_lowercase()
                .contains(&source.to_lowercase())
            {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }

    /// Filter, sort (stable, ties keep insertion order), and truncate
    pub(crate) fn apply<'a>(&self, logs: impl Iterator<Item = &'a LogEntry>) -> Vec<LogEntry> {
        let mut matched: Vec<LogEntry> = logs.filter(|e| self.matches(e)).cloned().collect();

        match self.order {
            SortOrder::NewestFirst => matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::OldestFirst => matched.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        }

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// Criteria for [`LogStore::search`](crate::LogStore::search)
///
/// Matches entries where the term occurs as a substring in any enabled
/// field. A term that is blank after trimming matches nothing.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    term: String,
    case_sensitive: bool,
    in_message: bool,
    in_source: bool,
    in_metadata: bool,
    level: Option<String>,
    limit: Option<usize>,
}

impl SearchQuery {
    /// Search for `term` in message, source, and metadata, case-insensitively
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            case_sensitive: false,
            in_message: true,
            in_source: true,
            in_metadata: true,
            level: None,
            limit: None,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn in_message(mut self, enabled: bool) -> Self {
        self.in_message = enabled;
        self
    }

    pub fn in_source(mut self, enabled: bool) -> Self {
        self.in_source = enabled;
        self
    }

    /// Match against the JSON string form of the metadata mapping
    pub fn in_metadata(mut self, enabled: bool) -> Self {
        self.in_metadata = enabled;
        self
    }

    /// Exact level match, case-insensitive on the input text
    pub fn level(mut self, level: impl AsRef<str>) -> Self {
        self.level = Some(level.as_ref().to_ascii_uppercase());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn field_matches(&self, needle: &str, haystack: &str) -> bool {
        if self.case_sensitive {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(needle)
        }
    }

    fn matches(&self, needle: &str, entry: &LogEntry) -> bool {
        if let Some(level) = &self.level {
            if entry.level.as_str() != level {
                return false;
            }
        }

        if self.in_message && self.field_matches(needle, &entry.message) {
            return true;
        }
        if self.in_source && self.field_matches(needle, &entry.source) {
            return true;
        }
        if self.in_metadata && !entry.metadata.is_empty() {
            let metadata_text = serde_json::to_string(&entry.metadata).unwrap_or_default();
            if self.field_matches(needle, &metadata_text) {
                return true;
            }
        }
        false
    }

    /// Filter, sort newest first, and truncate
    pub(crate) fn apply<'a>(&self, logs: impl Iterator<Item = &'a LogEntry>) -> Vec<LogEntry> {
        if self.term.trim().is_empty() {
            return Vec::new();
        }

        let needle = if self.case_sensitive {
            self.term.clone()
        } else {
            self.term.to_lowercase()
        };

        let mut matched: Vec<LogEntry> = logs
            .filter(|e| self.matches(&needle, e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}
