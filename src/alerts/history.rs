//! Alert history ring buffer
//!
//! Keeps the most recent alerts so the status API can show what happened
//! without a log search.

use std::collections::VecDeque;
use std::sync::RwLock;

use super::AlertRecord;

/// Default number of alerts retained
pub const DEFAULT_CAPACITY: usize = 100;

/// Ring buffer of recent alerts, oldest first
pub struct AlertHistory {
    entries: RwLock<VecDeque<AlertRecord>>,
    capacity: usize,
}

impl AlertHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Adds a record, evicting the oldest if at capacity
    pub fn push(&self, record: AlertRecord) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// Returns all records in chronological order
    pub fn get_all(&self) -> Vec<AlertRecord> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AlertHistory {
    fn default() -> Self {
        Self::new()
    }
}
