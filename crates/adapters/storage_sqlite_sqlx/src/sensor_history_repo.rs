//! `SQLite` implementation of [`SensorHistoryRepository`].

use sqlx::SqlitePool;

use venthub_app::ports::SensorHistoryRepository;
use venthub_domain::error::VentHubError;
use venthub_domain::id::SensorId;
use venthub_domain::sensor::SensorSample;
use venthub_domain::time::Timestamp;

use crate::error::StorageError;
use crate::timestamp;

const INSERT: &str = r"
    INSERT INTO sensor_history (sensor_id, value, recorded_at)
    VALUES (?, ?, ?)
";

const AVERAGE_IN_RANGE: &str = r"
    SELECT AVG(value) FROM sensor_history
    WHERE sensor_id = ? AND recorded_at >= ? AND recorded_at <= ?
";

const DELETE_BEFORE: &str = "DELETE FROM sensor_history WHERE recorded_at < ?";

/// `SQLite`-backed sensor history repository.
pub struct SqliteSensorHistoryRepository {
    pool: SqlitePool,
}

impl SqliteSensorHistoryRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SensorHistoryRepository for SqliteSensorHistoryRepository {
    async fn record(&self, sample: SensorSample) -> Result<(), VentHubError> {
        sqlx::query(INSERT)
            .bind(sample.sensor_id.as_str())
            .bind(sample.value)
            .bind(timestamp::encode(sample.recorded_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn average(
        &self,
        sensor: &SensorId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Option<f64>, VentHubError> {
        let average: Option<f64> = sqlx::query_scalar(AVERAGE_IN_RANGE)
            .bind(sensor.as_str())
            .bind(timestamp::encode(from))
            .bind(timestamp::encode(to))
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(average)
    }

    async fn purge_before(&self, before: Timestamp) -> Result<usize, VentHubError> {
        let result = sqlx::query(DELETE_BEFORE)
            .bind(timestamp::encode(before))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }
}
