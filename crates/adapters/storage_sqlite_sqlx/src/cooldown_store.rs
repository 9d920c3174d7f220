//! `SQLite` implementation of [`CooldownStore`].

use sqlx::{Row, SqlitePool};

use venthub_app::ports::CooldownStore;
use venthub_domain::error::VentHubError;
use venthub_domain::id::DeviceId;
use venthub_domain::time::{Timestamp, now};

use crate::error::StorageError;
use crate::timestamp;

const SELECT: &str = "SELECT blocked_until FROM cooldown WHERE device_id = ?";

const UPSERT: &str = r"
    INSERT INTO cooldown (device_id, blocked_until, updated_at)
    VALUES (?, ?, ?)
    ON CONFLICT (device_id) DO UPDATE SET
        blocked_until = excluded.blocked_until,
        updated_at = excluded.updated_at
";

/// `SQLite`-backed cooldown store, one row per device.
pub struct SqliteCooldownStore {
    pool: SqlitePool,
}

impl SqliteCooldownStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CooldownStore for SqliteCooldownStore {
    async fn get(&self, device: &DeviceId) -> Result<Option<Timestamp>, VentHubError> {
        let row = sqlx::query(SELECT)
            .bind(device.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("blocked_until").map_err(StorageError::from)?;
        Ok(Some(timestamp::decode(&raw).map_err(StorageError::from)?))
    }

    async fn set(&self, device: &DeviceId, blocked_until: Timestamp) -> Result<(), VentHubError> {
        sqlx::query(UPSERT)
            .bind(device.as_str())
            .bind(timestamp::encode(blocked_until))
            .bind(timestamp::encode(now()))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
