//! ChatRepository trait definition.
//!
//! The durable chat store behind the session cache. Turns are append-only;
//! the only destructive operation removes a whole session.

use parlor_types::chat::{ChatTurn, SessionSummary};
use parlor_types::error::RepositoryError;

/// Repository trait for chat turn persistence.
///
/// Implementations live in parlor-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Append a turn. Never overwrites existing history.
    fn save_turn(
        &self,
        turn: &ChatTurn,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All turns of a session, ordered by timestamp ASC (ties in write order).
    fn get_turns(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;

    /// All turns written by a user across sessions, ordered by timestamp ASC.
    fn get_user_turns(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;

    /// One summary per session of the user, most recent session first.
    ///
    /// Each summary carries the session's earliest message and timestamp.
    fn list_sessions(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, RepositoryError>> + Send;

    /// Delete every turn of a session. Returns how many turns were removed;
    /// zero for an unknown session.
    fn delete_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count stored turns across all sessions.
    fn count_turns(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count distinct stored sessions.
    fn count_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
