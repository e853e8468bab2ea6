//! Session History Ledger
//!
//! Bounded, in-memory, per-session log of past recommendations.
//! Shared by concurrent requests; append-then-evict runs as one atomic
//! unit under the map lock. History is intentionally lost on restart.

use chrono::Utc;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::VecDeque;

/// Default number of entries retained per session.
pub const DEFAULT_HISTORY_CAP: usize = 5;

/// One past recommendation. Appended, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub crop: String,
    pub confidence: f64,
    /// UTC, ISO-8601.
    pub timestamp: String,
}

/// Per-session bounded recommendation log
///
/// Injected into the service explicitly so tests can substitute an
/// isolated instance; insertion order is recency order, oldest first.
#[derive(Debug)]
pub struct SessionHistoryLedger {
    cap: usize,
    sessions: Mutex<FxHashMap<String, VecDeque<HistoryEntry>>>,
}

impl Default for SessionHistoryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl SessionHistoryLedger {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            sessions: Mutex::new(FxHashMap::default()),
        }
    }

    /// Append one entry, evicting the oldest past the cap.
    ///
    /// An empty session id is a silent no-op: anonymous callers get no
    /// history tracking rather than an error.
    pub fn add(&self, session_id: &str, crop: &str, confidence: f64) {
        if session_id.is_empty() {
            return;
        }

        let entry = HistoryEntry {
            crop: crop.to_string(),
            confidence,
            timestamp: Utc::now().to_rfc3339(),
        };

        let mut sessions = self.sessions.lock();
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push_back(entry);
        while history.len() > self.cap {
            history.pop_front();
        }
    }

    /// Ordered history for a session, empty for unknown or empty ids.
    pub fn get(&self, session_id: &str) -> Vec<HistoryEntry> {
        if session_id.is_empty() {
            return Vec::new();
        }

        self.sessions
            .lock()
            .get(session_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove a session's entries entirely.
    pub fn clear(&self, session_id: &str) {
        if session_id.is_empty() {
            return;
        }

        self.sessions.lock().remove(session_id);
    }

    /// Number of distinct sessions currently held. Session ids are
    /// never evicted, so operators can watch this for unbounded growth.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}
