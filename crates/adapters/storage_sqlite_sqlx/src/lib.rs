//! # venthub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `CooldownStore` and `SensorHistoryRepository` from `venthub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `venthub-app` (for port traits) and `venthub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod cooldown_store;
mod error;
mod pool;
mod sensor_history_repo;
mod timestamp;

pub use cooldown_store::SqliteCooldownStore;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use sensor_history_repo::SqliteSensorHistoryRepository;
