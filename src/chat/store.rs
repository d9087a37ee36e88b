//! Append-only message log.
use sqlx::SqlitePool;

use super::message::Message;

#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, msg: &Message) -> Result<(), sqlx::Error>;
    /// Every stored message, oldest first.
    async fn list_all(&self) -> Result<Vec<Message>, sqlx::Error>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageStore for SqliteStore {
    async fn insert(&self, msg: &Message) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO messages (username, message, timestamp) VALUES (?,?,?)")
            .bind(&msg.username)
            .bind(&msg.body)
            .bind(msg.timestamp)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as("SELECT username, message, timestamp FROM messages ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }
}
