use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::room_lock::RoomLock;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

/// Room write lease stored in `distributed_locks`, shared by every process
/// using the same database.
#[derive(Clone)]
pub struct DatabaseRoomLock {
    db: Database,
}

impl DatabaseRoomLock {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomLock for DatabaseRoomLock {
    async fn acquire(&self, key: &str, owner: &str, ttl_seconds: u64) -> DomainResult<bool> {
        let now = Utc::now();
        let expires_at = (now + chrono::Duration::seconds(ttl_seconds as i64))
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let now = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        // Take the row if it is free or its lease has lapsed. Fixed-width UTC
        // timestamps compare correctly as text.
        let result = sqlx::query(
            "INSERT INTO distributed_locks (key, owner, expires_at, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 owner = excluded.owner,
                 expires_at = excluded.expires_at,
                 created_at = excluded.created_at
             WHERE distributed_locks.expires_at < ?",
        )
        .bind(key)
        .bind(owner)
        .bind(&expires_at)
        .bind(&now)
        .bind(&now)
        .execute(&self.db.pool)
        .await
        .map_err(|e| DomainError::StoreUnavailable(format!("Failed to acquire lock: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, key: &str, owner: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM distributed_locks WHERE key = ? AND owner = ?")
            .bind(key)
            .bind(owner)
            .execute(&self.db.pool)
            .await
            .map_err(|e| DomainError::StoreUnavailable(format!("Failed to release lock: {}", e)))?;
        Ok(())
    }
}
