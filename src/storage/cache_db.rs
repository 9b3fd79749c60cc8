use rusqlite::{OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use crate::common::ChatMessage;

use super::database::Database;
use super::models::CachedSession;

/// Local cache: login session plus message history already seen,
/// so conversations render before the first watch delivery lands.
pub struct CacheDatabase {
    db: Database,
}

impl CacheDatabase {
    /// Initialize cache at default location
    pub fn new() -> SqlResult<Self> {
        Self::with_path("data/cache.db")
    }

    /// Initialize cache at custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let db = Database::new(path)?;
        let cache_db = Self { db };
        cache_db.init_schema()?;
        Ok(cache_db)
    }

    /// In-memory cache for tests
    pub fn in_memory() -> SqlResult<Self> {
        let db = Database::in_memory()?;
        let cache_db = Self { db };
        cache_db.init_schema()?;
        Ok(cache_db)
    }

    fn init_schema(&self) -> SqlResult<()> {
        let conn = self.db.connection();

        // Session table (single row)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                openid TEXT NOT NULL,
                nick_name TEXT NOT NULL,
                avatar_url TEXT NOT NULL,
                logged_in_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;

        // Messages table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                send_time TEXT NOT NULL,
                send_time_ts INTEGER NOT NULL,
                sender TEXT NOT NULL,
                recipient TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_send_time_ts ON messages(send_time_ts)",
            [],
        )?;

        Ok(())
    }

    // ========== Session ==========

    /// Store the logged-in session, replacing any previous one
    pub fn save_session(&self, session: &CachedSession) -> SqlResult<()> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT OR REPLACE INTO session (id, openid, nick_name, avatar_url, logged_in_at)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                session.openid,
                session.nick_name,
                session.avatar_url,
                session.logged_in_at
            ],
        )?;
        Ok(())
    }

    /// Get the cached session, if a login is stored
    pub fn load_session(&self) -> SqlResult<Option<CachedSession>> {
        let conn = self.db.connection();
        conn.query_row(
            "SELECT openid, nick_name, avatar_url, logged_in_at FROM session WHERE id = 1",
            [],
            |row| {
                Ok(CachedSession {
                    openid: row.get(0)?,
                    nick_name: row.get(1)?,
                    avatar_url: row.get(2)?,
                    logged_in_at: row.get(3)?,
                })
            },
        )
        .optional()
    }

    /// Drop the cached session (logout)
    pub fn clear_session(&self) -> SqlResult<()> {
        let conn = self.db.connection();
        conn.execute("DELETE FROM session WHERE id = 1", [])?;
        Ok(())
    }

    // ========== Messages ==========

    /// Insert a message; duplicates by id are ignored
    pub fn insert_message(&self, message: &ChatMessage) -> SqlResult<()> {
        let id = match &message.id {
            Some(id) => id.clone(),
            // Locally-built docs have no backend id yet
            None => format!(
                "{}:{}:{}",
                message.sender, message.recipient, message.send_time_ts
            ),
        };

        let conn = self.db.connection();
        conn.execute(
            "INSERT OR IGNORE INTO messages (id, content, send_time, send_time_ts, sender, recipient)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                message.content,
                message.send_time,
                message.send_time_ts,
                message.sender,
                message.recipient
            ],
        )?;
        Ok(())
    }

    /// Get the cached history of one conversation, oldest first
    pub fn conversation(&self, openid: &str, peer: &str) -> SqlResult<Vec<ChatMessage>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, content, send_time, send_time_ts, sender, recipient
             FROM messages
             WHERE (sender = ?1 AND recipient = ?2) OR (sender = ?2 AND recipient = ?1)
             ORDER BY send_time_ts ASC",
        )?;

        let messages = stmt
            .query_map(params![openid, peer], |row| {
                Ok(ChatMessage {
                    id: Some(row.get(0)?),
                    content: row.get(1)?,
                    send_time: row.get(2)?,
                    send_time_ts: row.get(3)?,
                    sender: row.get(4)?,
                    recipient: row.get(5)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(messages)
    }

    /// Latest cached timestamp of one conversation, if any
    pub fn latest_timestamp(&self, openid: &str, peer: &str) -> SqlResult<Option<i64>> {
        let conn = self.db.connection();
        conn.query_row(
            "SELECT MAX(send_time_ts) FROM messages
             WHERE (sender = ?1 AND recipient = ?2) OR (sender = ?2 AND recipient = ?1)",
            params![openid, peer],
            |row| row.get::<_, Option<i64>>(0),
        )
    }
}
