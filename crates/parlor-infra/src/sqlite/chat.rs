//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parlor-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader for SELECTs
//! and writer for INSERT/DELETE.

use chrono::{DateTime, SecondsFormat, Utc};
use parlor_core::chat::repository::ChatRepository;
use parlor_types::chat::{ChatTurn, SessionSummary};
use parlor_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatTurn.
struct ChatTurnRow {
    id: String,
    user_id: String,
    session_id: String,
    message: String,
    response: String,
    timestamp: String,
}

impl ChatTurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            session_id: row.try_get("session_id")?,
            message: row.try_get("message")?,
            response: row.try_get("response")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_turn(self) -> Result<ChatTurn, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid turn id: {e}")))?;
        let timestamp = parse_datetime(&self.timestamp)?;

        Ok(ChatTurn {
            id,
            user_id: self.user_id,
            session_id: self.session_id,
            message: self.message,
            response: self.response,
            timestamp,
        })
    }
}

/// Internal row type for the per-session summary query.
struct SessionSummaryRow {
    session_id: String,
    first_message: String,
    timestamp: String,
}

impl SessionSummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            first_message: row.try_get("first_message")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_summary(self) -> Result<SessionSummary, RepositoryError> {
        Ok(SessionSummary {
            session_id: self.session_id,
            first_message: self.first_message,
            timestamp: parse_datetime(&self.timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so that text order matches chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

fn rows_to_turns(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatTurn>, RepositoryError> {
    let mut turns = Vec::with_capacity(rows.len());
    for row in rows {
        let turn_row = ChatTurnRow::from_row(row).map_err(map_sqlx_error)?;
        turns.push(turn_row.into_turn()?);
    }
    Ok(turns)
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn save_turn(&self, turn: &ChatTurn) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_turns (id, user_id, session_id, message, response, timestamp)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(&turn.user_id)
        .bind(&turn.session_id)
        .bind(&turn.message)
        .bind(&turn.response)
        .bind(format_datetime(&turn.timestamp))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_turns WHERE session_id = ? ORDER BY timestamp ASC, seq ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        rows_to_turns(&rows)
    }

    async fn get_user_turns(&self, user_id: &str) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_turns WHERE user_id = ? ORDER BY timestamp ASC, seq ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        rows_to_turns(&rows)
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, RepositoryError> {
        // One row per session: the earliest turn of each of the user's sessions.
        let rows = sqlx::query(
            r#"SELECT t.session_id, t.message AS first_message, t.timestamp
               FROM chat_turns t
               WHERE t.user_id = ?
                 AND t.seq = (
                     SELECT f.seq FROM chat_turns f
                     WHERE f.session_id = t.session_id AND f.user_id = t.user_id
                     ORDER BY f.timestamp ASC, f.seq ASC
                     LIMIT 1
                 )
               ORDER BY t.timestamp DESC, t.seq DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let summary_row = SessionSummaryRow::from_row(row).map_err(map_sqlx_error)?;
            sessions.push(summary_row.into_summary()?);
        }

        Ok(sessions)
    }

    async fn delete_session(&self, session_id: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_turns WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn count_turns(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM chat_turns")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(DISTINCT session_id) AS cnt FROM chat_turns")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let count: i64 = row.try_get("cnt").map_err(map_sqlx_error)?;
        Ok(count as u64)
    }
}
