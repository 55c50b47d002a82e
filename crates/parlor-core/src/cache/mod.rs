//! In-memory session cache.
//!
//! A fixed-capacity LRU keyed by session id. The cache is a latency
//! optimization in front of the chat store and never the source of truth.

pub mod lru;

pub use lru::LruCache;

use parlor_types::chat::ChatTurn;

/// Cache from session id to that session's turns in chronological order.
pub type SessionCache = LruCache<String, Vec<ChatTurn>>;
