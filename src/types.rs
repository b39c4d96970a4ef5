//! Core log types for loghub
//!
//! Wire records use snake_case JSON field names and RFC 3339 timestamp
//! text so existing producers and viewers keep working unchanged.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Metadata attached to a log entry — arbitrary JSON key/value pairs
pub type Metadata = Map<String, Value>;

/// Severity of a log entry, ordered lowest to highest
///
/// Parsing is lossy by contract: unrecognized input normalizes to `Info`
/// rather than failing, so intake never rejects an entry over its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// All levels, lowest severity first
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Parse a level case-insensitively, defaulting to `Info` when unrecognized
    pub fn parse_lossy(input: &str) -> Self {
        match input.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARNING" => LogLevel::Warning,
            "ERROR" => LogLevel::Error,
            "CRITICAL" => LogLevel::Critical,
            _ => LogLevel::Info,
        }
    }

    /// Upper-case wire name of the level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// True for `Error` and `Critical`
    pub fn is_error(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Critical)
    }

    /// True for `Warning`, `Error`, and `Critical`
    pub fn is_warning_or_above(&self) -> bool {
        *self >= LogLevel::Warning
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(LogLevel::parse_lossy(&text))
    }
}

/// One immutable log record
///
/// Entries are constructed by the store, which assigns the id. Fields are
/// never mutated after insertion; entries leave the store only by eviction
/// or an explicit clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Store-assigned identifier, strictly increasing, never reused
    pub id: u64,

    /// When the entry was logged (producer-supplied or insertion time)
    #[serde(with = "lenient_rfc3339")]
    pub timestamp: DateTime<Utc>,

    /// Severity level
    pub level: LogLevel,

    /// Log message text
    #[serde(default)]
    pub message: String,

    /// Producing system or component
    #[serde(default = "default_source")]
    pub source: String,

    /// Optional structured metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl LogEntry {
    /// True if this entry is `Error` or `Critical`
    pub fn is_error(&self) -> bool {
        self.level.is_error()
    }

    /// True if this entry is `Warning` level or above
    pub fn is_warning_or_above(&self) -> bool {
        self.level.is_warning_or_above()
    }

    /// Serialize the entry to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.source,
            self.message
        )
    }
}

/// An incoming log record before the store assigns it an id
///
/// Every field is optional; construction never fails. Missing or invalid
/// input defaults: level `INFO`, message empty, source `"unknown"`,
/// metadata empty, timestamp the insertion instant. An unparsable
/// timestamp string also falls back to the insertion instant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub level: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// RFC 3339 timestamp text, e.g. `2026-03-01T12:00:00.123456Z`
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl NewEntry {
    /// Start an empty record (all fields defaulted)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level text (normalized case-insensitively at insertion)
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Set the message text
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the source
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the metadata mapping
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set an explicit RFC 3339 timestamp
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Parse a record from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize into a full entry with the given store-assigned id
    pub(crate) fn into_entry(self, id: u64) -> LogEntry {
        LogEntry {
            id,
            timestamp: self
                .timestamp
                .as_deref()
                .map(parse_timestamp_lossy)
                .unwrap_or_else(Utc::now),
            level: LogLevel::parse_lossy(self.level.as_deref().unwrap_or("INFO")),
            message: self.message.unwrap_or_default(),
            source: self.source.unwrap_or_else(default_source),
            metadata: self.metadata.unwrap_or_default(),
        }
    }
}

/// The full-state message broadcast to live subscribers after a mutation
///
/// `logs` is the complete current store content, newest first. Delivery is
/// a full-state replace, never a delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogUpdate {
    pub success: bool,

    /// Current store size
    pub count: usize,

    /// All retained entries, newest first
    pub logs: Vec<LogEntry>,
}

fn default_source() -> String {
    "unknown".to_string()
}

/// Parse an RFC 3339 timestamp, falling back to now when unparsable
fn parse_timestamp_lossy(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Timestamp (de)serialization as RFC 3339 text with a lossy fallback
///
/// Serializes with full sub-second precision so entries round-trip; an
/// unparsable inbound string decodes to the current instant instead of
/// failing the whole record.
mod lenient_rfc3339 {
    use super::parse_timestamp_lossy;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(parse_timestamp_lossy(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_entry() -> LogEntry {
        LogEntry {
            id: 7,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 45).unwrap(),
            level: LogLevel::Error,
            message: "disk quota exceeded".to_string(),
            source: "worker-3".to_string(),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_level_parse_case_insensitive() {
        assert_eq!(LogLevel::parse_lossy("error"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lossy("ERROR"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lossy("Warning"), LogLevel::Warning);
        assert_eq!(LogLevel::parse_lossy("cRiTiCaL"), LogLevel::Critical);
        assert_eq!(LogLevel::parse_lossy("debug"), LogLevel::Debug);
    }

    #[test]
    fn test_level_parse_unrecognized_defaults_to_info() {
        assert_eq!(LogLevel::parse_lossy("verbose"), LogLevel::Info);
        assert_eq!(LogLevel::parse_lossy(""), LogLevel::Info);
        assert_eq!(LogLevel::parse_lossy("WARN"), LogLevel::Info);
    }

    #[test]
    fn test_level_severity_predicates() {
        assert!(LogLevel::Error.is_error());
        assert!(LogLevel::Critical.is_error());
        assert!(!LogLevel::Warning.is_error());

        assert!(LogLevel::Warning.is_warning_or_above());
        assert!(LogLevel::Critical.is_warning_or_above());
        assert!(!LogLevel::Info.is_warning_or_above());
        assert!(!LogLevel::Debug.is_warning_or_above());
    }

    #[test]
    fn test_level_serializes_upper_case() {
        let json = serde_json::to_string(&LogLevel::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
    }

    #[test]
    fn test_level_deserialize_normalizes() {
        let level: LogLevel = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(level, LogLevel::Critical);

        let level: LogLevel = serde_json::from_str("\"nonsense\"").unwrap();
        assert_eq!(level, LogLevel::Info);
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let mut entry = sample_entry();
        entry
            .metadata
            .insert("attempt".to_string(), serde_json::json!(3));

        let json = entry.to_json().unwrap();
        assert!(json.contains("\"level\":\"ERROR\""));
        assert!(json.contains("\"source\":\"worker-3\""));
        assert!(json.contains("2026-03-01T12:30:45"));

        let parsed: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, entry.id);
        assert_eq!(parsed.timestamp, entry.timestamp);
        assert_eq!(parsed.level, LogLevel::Error);
        assert_eq!(parsed.message, entry.message);
        assert_eq!(parsed.metadata["attempt"], 3);
    }

    #[test]
    fn test_entry_unparsable_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let json = r#"{
            "id": 1,
            "timestamp": "yesterday-ish",
            "level": "INFO",
            "message": "m",
            "source": "s",
            "metadata": {}
        }"#;
        let parsed: LogEntry = serde_json::from_str(json).unwrap();
        assert!(parsed.timestamp >= before);
        assert!(parsed.timestamp <= Utc::now());
    }

    #[test]
    fn test_entry_display_format() {
        let entry = sample_entry();
        assert_eq!(
            entry.to_string(),
            "[2026-03-01 12:30:45] ERROR - worker-3: disk quota exceeded"
        );
    }

    #[test]
    fn test_new_entry_defaults() {
        let before = Utc::now();
        let entry = NewEntry::new().into_entry(1);

        assert_eq!(entry.id, 1);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "");
        assert_eq!(entry.source, "unknown");
        assert!(entry.metadata.is_empty());
        assert!(entry.timestamp >= before);
    }

    #[test]
    fn test_new_entry_builder_and_normalization() {
        let entry = NewEntry::new()
            .level("warning")
            .message("slow response")
            .source("gateway")
            .timestamp("2026-03-01T08:00:00Z")
            .into_entry(42);

        assert_eq!(entry.id, 42);
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.source, "gateway");
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_new_entry_invalid_level_and_timestamp() {
        let before = Utc::now();
        let entry = NewEntry::new()
            .level("loudest")
            .timestamp("not a time")
            .into_entry(1);

        assert_eq!(entry.level, LogLevel::Info);
        assert!(entry.timestamp >= before);
    }

    #[test]
    fn test_new_entry_from_json_partial_record() {
        let record = NewEntry::from_json(r#"{"message": "hello", "level": "debug"}"#).unwrap();
        let entry = record.into_entry(5);
        assert_eq!(entry.level, LogLevel::Debug);
        assert_eq!(entry.message, "hello");
        assert_eq!(entry.source, "unknown");
    }

    #[test]
    fn test_update_payload_shape() {
        let update = LogUpdate {
            success: true,
            count: 1,
            logs: vec![sample_entry()],
        };

        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"count\":1"));
        assert!(json.contains("\"logs\":[{"));
    }
}
