//! Gameplay event log
//!
//! A bounded, newest-first feed of human-readable entries shown next to the
//! play surface. Write-only from the game's point of view.

use std::collections::VecDeque;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Maps simulation time (host monotonic milliseconds) to local wall-clock time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallClock {
    /// Unix epoch milliseconds at simulation time zero
    pub origin_epoch_ms: f64,
    /// Local offset from UTC in minutes (east positive)
    pub utc_offset_minutes: i32,
}

impl WallClock {
    /// `HH:MM:SS` local time for a simulation timestamp
    pub fn format(&self, now_ms: f64) -> String {
        let epoch_ms = (self.origin_epoch_ms + now_ms).floor() as i64
            + self.utc_offset_minutes as i64 * 60_000;
        let day_ms = epoch_ms.rem_euclid(MS_PER_DAY);
        let secs = day_ms / 1000;
        format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        )
    }
}

/// One log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.timestamp, self.message)
    }
}

/// Bounded newest-first log
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    /// Total pushes ever; lets a view skip redraws when nothing changed
    revision: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            revision: 0,
        }
    }

    /// Prepend an entry, evicting the oldest past capacity
    pub fn push(&mut self, timestamp: String, message: impl Into<String>) {
        self.entries.push_front(LogEntry {
            timestamp,
            message: message.into(),
        });
        self.entries.truncate(self.capacity);
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
