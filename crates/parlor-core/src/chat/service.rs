//! Session service layering the LRU session cache over the chat store.
//!
//! Writes go through to both the store and the cache; reads check the cache
//! first and fall back to the store, populating the cache on the way out.
//! The store is the source of truth: store failures surface to the caller,
//! cache conditions (misses, evictions) never do.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use parlor_types::chat::{
    CacheSnapshot, CacheSnapshotEntry, ChatTurn, HistorySource, ServiceStats, SessionHistory,
    SessionSummary,
};
use parlor_types::error::SessionError;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::chat::repository::ChatRepository;

/// Orchestrates session history over a chat store and an owned LRU cache.
///
/// Generic over `ChatRepository` to maintain clean architecture
/// (parlor-core never depends on parlor-infra). The cache is guarded by a
/// single mutex that is never held across an `.await`.
///
/// `deletions` counts completed session deletes. It only changes while the
/// cache lock is held; a save or read-through that saw it change across its
/// store call must not cache what it got from the store.
pub struct SessionService<C: ChatRepository> {
    chat_repo: C,
    cache: Mutex<SessionCache>,
    deletions: AtomicU64,
}

impl<C: ChatRepository> SessionService<C> {
    /// Create a service whose cache holds at most `cache_size` sessions.
    pub fn new(chat_repo: C, cache_size: usize) -> Self {
        Self {
            chat_repo,
            cache: Mutex::new(SessionCache::new(cache_size)),
            deletions: AtomicU64::new(0),
        }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    fn cache(&self) -> MutexGuard<'_, SessionCache> {
        self.cache.lock().expect("session cache lock poisoned")
    }

    fn deletion_epoch(&self) -> u64 {
        self.deletions.load(Ordering::SeqCst)
    }

    // --- Turns ---

    /// Persist a new turn and append it to the session's cached history.
    ///
    /// If the store write fails the cache is left untouched. Once the store
    /// write succeeds the call succeeds; the cache update cannot fail.
    pub async fn save_turn(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ChatTurn, SessionError> {
        require("user_id", user_id)?;
        require("session_id", session_id)?;
        require("message", message)?;

        let turn = ChatTurn::new(user_id, session_id, message, response);
        let epoch = self.deletion_epoch();

        self.chat_repo.save_turn(&turn).await.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to persist chat turn");
            e
        })?;

        let evicted = {
            let mut cache = self.cache();
            let mut turns = cache.delete(session_id).unwrap_or_default();
            if self.deletion_epoch() != epoch {
                // A delete may have removed this turn from the store already.
                debug!(session_id = %session_id, "Session deleted during save, cache entry dropped");
                Vec::new()
            } else {
                insert_chronological(&mut turns, turn.clone());
                debug!(session_id = %session_id, turns = turns.len(), "Session cache updated");
                cache.set(session_id.to_string(), turns)
            }
        };
        log_evictions(&evicted);

        Ok(turn)
    }

    /// Fetch a session's turns, cache first.
    ///
    /// Returns `Ok(None)` when the session has no history anywhere.
    pub async fn get_session_history(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionHistory>, SessionError> {
        require("session_id", session_id)?;

        let cached = self.cache().get(session_id).cloned();
        if let Some(turns) = cached {
            debug!(session_id = %session_id, "Session cache hit");
            return Ok(Some(SessionHistory {
                turns,
                source: HistorySource::Cache,
            }));
        }

        let epoch = self.deletion_epoch();
        let turns = self.chat_repo.get_turns(session_id).await.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to load session history");
            e
        })?;
        debug!(session_id = %session_id, turns = turns.len(), "Session cache miss, loaded from store");

        if turns.is_empty() {
            return Ok(None);
        }

        let (turns, evicted) = {
            let mut cache = self.cache();
            if self.deletion_epoch() != epoch {
                debug!(session_id = %session_id, "Session deleted during load, not caching");
                return Ok(Some(SessionHistory {
                    turns,
                    source: HistorySource::Store,
                }));
            }
            // A save may have cached newer turns while the store was queried.
            let turns = match cache.peek(session_id) {
                Some(cached) => merge_turns(turns, cached),
                None => turns,
            };
            let evicted = cache.set(session_id.to_string(), turns.clone());
            (turns, evicted)
        };
        log_evictions(&evicted);

        Ok(Some(SessionHistory {
            turns,
            source: HistorySource::Store,
        }))
    }

    /// Every turn a user has written, oldest first. Always served by the store.
    pub async fn get_user_history(&self, user_id: &str) -> Result<Vec<ChatTurn>, SessionError> {
        require("user_id", user_id)?;
        Ok(self.chat_repo.get_user_turns(user_id).await?)
    }

    // --- Session lifecycle ---

    /// List a user's sessions, most recent first. Always served by the store.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, SessionError> {
        require("user_id", user_id)?;
        Ok(self.chat_repo.list_sessions(user_id).await?)
    }

    /// Mint a new session id.
    ///
    /// Nothing is written until the first turn is saved, so an unused
    /// session simply never appears anywhere.
    pub fn create_session(&self) -> SessionSummary {
        let session = SessionSummary {
            session_id: Uuid::new_v4().to_string(),
            first_message: String::new(),
            timestamp: Utc::now(),
        };
        debug!(session_id = %session.session_id, "Session created");
        session
    }

    /// Delete a session from the store and drop it from the cache.
    ///
    /// Idempotent: deleting an unknown session removes nothing and succeeds.
    /// Returns the number of stored turns removed.
    pub async fn delete_session(&self, session_id: &str) -> Result<u64, SessionError> {
        require("session_id", session_id)?;

        let removed = self.chat_repo.delete_session(session_id).await.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to delete session");
            e
        })?;
        {
            let mut cache = self.cache();
            cache.delete(session_id);
            self.deletions.fetch_add(1, Ordering::SeqCst);
        }

        info!(session_id = %session_id, removed, "Session deleted");
        Ok(removed)
    }

    // --- Cache introspection ---

    /// Snapshot of the cache contents, most recently used first.
    pub fn cache_snapshot(&self) -> CacheSnapshot {
        let cache = self.cache();
        CacheSnapshot {
            entries: cache
                .to_vec()
                .into_iter()
                .map(|(key, value)| CacheSnapshotEntry { key, value })
                .collect(),
            size: cache.len(),
            max_size: cache.max_size(),
        }
    }

    /// Empty the cache. Returns how many sessions were dropped.
    pub fn clear_cache(&self) -> usize {
        let mut cache = self.cache();
        if cache.is_empty() {
            return 0;
        }
        let dropped = cache.len();
        cache.clear();
        info!(dropped, "Session cache cleared");
        dropped
    }

    /// Store counters plus current cache occupancy.
    pub async fn stats(&self) -> Result<ServiceStats, SessionError> {
        let stored_turns = self.chat_repo.count_turns().await?;
        let stored_sessions = self.chat_repo.count_sessions().await?;
        let (cached_sessions, cache_capacity) = {
            let cache = self.cache();
            (cache.len(), cache.max_size())
        };
        Ok(ServiceStats {
            stored_turns,
            stored_sessions,
            cached_sessions,
            cache_capacity,
        })
    }
}

fn require(field: &str, value: &str) -> Result<(), SessionError> {
    if value.trim().is_empty() {
        return Err(SessionError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Insert keeping timestamp order. Appends in the common case.
fn insert_chronological(turns: &mut Vec<ChatTurn>, turn: ChatTurn) {
    let pos = turns
        .iter()
        .rposition(|t| t.timestamp <= turn.timestamp)
        .map_or(0, |p| p + 1);
    turns.insert(pos, turn);
}

/// Store rows plus any cached turns the store query did not see.
fn merge_turns(mut stored: Vec<ChatTurn>, cached: &[ChatTurn]) -> Vec<ChatTurn> {
    for turn in cached {
        if !stored.iter().any(|t| t.id == turn.id) {
            insert_chronological(&mut stored, turn.clone());
        }
    }
    stored
}

fn log_evictions(evicted: &[(String, Vec<ChatTurn>)]) {
    for (session_id, turns) in evicted {
        debug!(session_id = %session_id, turns = turns.len(), "Evicted least recently used session");
    }
}
