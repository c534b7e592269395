//! Report Data Structures

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;
use std::fmt;
use std::time::Duration;

/// stderr text of a placeholder entry, matched on by downstream consumers
pub const PLACEHOLDER_STDERR: &str = "(error occured)";

/// Wall-clock seconds, always rendered with six decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Realtime(f64);

impl Realtime {
    /// Marker used by placeholder entries
    pub const UNKNOWN: Realtime = Realtime(-1.0);

    /// Seconds from a measured duration, truncated to whole microseconds
    pub fn from_duration(elapsed: Duration) -> Self {
        Self(elapsed.as_micros() as f64 / 1_000_000.0)
    }

    /// Value in seconds
    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Realtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl Serialize for Realtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // A raw token keeps trailing zeros that f64 serialization would drop
        let raw = RawValue::from_string(self.to_string()).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

/// Resource figures for one invocation window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Usage {
    /// User CPU ticks spent
    pub utime: u64,
    /// System CPU ticks spent
    pub stime: u64,
    /// Elapsed wall-clock time
    pub realtime: Realtime,
    /// Peak resident memory after the invocation, in kB
    pub max_memory: u64,
}

/// Per-testcase report entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Return value, `null` on fault
    pub result: Value,
    /// User CPU ticks
    pub utime: i64,
    /// System CPU ticks
    pub stime: i64,
    /// Elapsed seconds
    pub realtime: Realtime,
    /// Peak resident memory in kB
    pub max_memory: i64,
    /// Captured output, trimmed
    pub stdout: String,
    /// Fault trace, trimmed; `null` on success
    pub stderr: Option<String>,
}

impl ReportEntry {
    /// Entry for a completed invocation; `Err` carries the fault trace
    pub fn new(outcome: Result<Value, String>, stdout: &str, usage: Usage) -> Self {
        let (result, stderr) = match outcome {
            Ok(value) => (value, None),
            Err(trace) => (Value::Null, Some(trace.trim().to_string())),
        };

        Self {
            result,
            utime: clamp(usage.utime),
            stime: clamp(usage.stime),
            realtime: usage.realtime,
            max_memory: clamp(usage.max_memory),
            stdout: stdout.trim().to_string(),
            stderr,
        }
    }

    /// Fallback entry for a testcase the harness produced nothing for
    pub fn placeholder() -> Self {
        Self {
            result: Value::Null,
            utime: -1,
            stime: -1,
            realtime: Realtime::UNKNOWN,
            max_memory: -1,
            stdout: String::new(),
            stderr: Some(PLACEHOLDER_STDERR.to_string()),
        }
    }

    /// Whether the invocation faulted
    pub fn is_fault(&self) -> bool {
        self.stderr.is_some()
    }
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Complete run report, keyed by testcase in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    entries: Vec<(String, ReportEntry)>,
}

impl Report {
    /// Empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty report with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Placeholder entries for every key, in order
    pub fn placeholder<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            entries: keys
                .into_iter()
                .map(|key| (key.into(), ReportEntry::placeholder()))
                .collect(),
        }
    }

    /// Append an entry
    pub fn push(&mut self, key: impl Into<String>, entry: ReportEntry) {
        self.entries.push((key.into(), entry));
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `key`
    pub fn get(&self, key: &str) -> Option<&ReportEntry> {
        self.entries
            .iter()
            .find_map(|(k, entry)| (k == key).then_some(entry))
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportEntry)> {
        self.entries.iter().map(|(k, entry)| (k.as_str(), entry))
    }

    /// Aggregate counts
    pub fn summary(&self) -> ReportSummary {
        let faulted = self.entries.iter().filter(|(_, e)| e.is_fault()).count();
        ReportSummary {
            total: self.entries.len(),
            succeeded: self.entries.len() - faulted,
            faulted,
            total_realtime: self
                .entries
                .iter()
                .map(|(_, e)| e.realtime.seconds().max(0.0))
                .sum(),
        }
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

/// Report summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    /// Testcases run
    pub total: usize,
    /// Testcases that returned normally
    pub succeeded: usize,
    /// Testcases that faulted
    pub faulted: usize,
    /// Sum of realtime across entries, in seconds
    pub total_realtime: f64,
}
