//! Chat turn, session summary, and cache snapshot types for Parlor.
//!
//! A session is an ordered sequence of chat turns. Each turn pairs one user
//! message with the assistant response it received.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// One exchange within a session: a user message and the assistant reply.
///
/// Turns are immutable once created. The same value is written to the chat
/// store and to the session cache, so a cached history and a history reloaded
/// from the store compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub user_id: String,
    pub session_id: String,
    /// What the user said.
    pub message: String,
    /// What the assistant answered.
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Build a new turn stamped with the current time.
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            message: message.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Summary row for a user's session list.
///
/// `first_message` and `timestamp` come from the earliest turn of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub first_message: String,
    pub timestamp: DateTime<Utc>,
}

/// Where a session history was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySource {
    Cache,
    Store,
}

impl fmt::Display for HistorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistorySource::Cache => write!(f, "cache"),
            HistorySource::Store => write!(f, "store"),
        }
    }
}

/// A session's turns in chronological order, tagged with their source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistory {
    pub turns: Vec<ChatTurn>,
    pub source: HistorySource,
}

impl SessionHistory {
    /// Whether the history was a cache hit.
    pub fn is_cached(&self) -> bool {
        self.source == HistorySource::Cache
    }
}

/// One cached session as seen by the debug dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshotEntry {
    pub key: String,
    pub value: Vec<ChatTurn>,
}

/// Point-in-time view of the session cache.
///
/// Entries are ordered from most to least recently used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub entries: Vec<CacheSnapshotEntry>,
    pub size: usize,
    pub max_size: usize,
}

/// Counters reported by `parlor status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub stored_turns: u64,
    pub stored_sessions: u64,
    pub cached_sessions: usize,
    pub cache_capacity: usize,
}
