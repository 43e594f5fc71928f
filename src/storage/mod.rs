pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use std::sync::Arc;

/// Open the configured backend. The caller still has to run `init()`.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        DatabaseBackend::Sqlite => {
            Arc::new(SqliteStorage::new(&config.url, config.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            Arc::new(PostgresStorage::new(&config.url, config.max_connections).await?)
        }
    };
    Ok(storage)
}
