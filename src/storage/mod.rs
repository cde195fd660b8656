//! # Storage and Persistence
//!
//! Database connectivity and the persistence layer for ingestion orders and
//! analysis records.

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repositories;

#[cfg(all(test, feature = "postgres_tests"))]
pub mod test_helpers;

pub use crate::config::DatabaseConfig;

pub use memory::MemoryStore;
pub use migrations::{get_migration_version, run_migrations};
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
pub use repositories::{
    AnalysisQuery, AnalysisRepository, AnalysisSummary, KindCounts, OrderRepository,
    SqlxAnalysisRepository, SqlxOrderRepository,
};

use std::sync::Arc;

use crate::errors::{ListenerError, Result};

/// The stores the services work against
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderRepository>,
    pub analyses: Arc<dyn AnalysisRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            orders: Arc::new(SqlxOrderRepository::new(pool.clone())),
            analyses: Arc::new(SqlxAnalysisRepository::new(pool)),
        }
    }

    /// Both stores backed by one in-process `MemoryStore`
    pub fn memory(store: MemoryStore) -> Self {
        Self { orders: Arc::new(store.clone()), analyses: Arc::new(store) }
    }

    /// Connect according to the configured database URL
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.is_memory() {
            tracing::warn!("Using in-memory store, data is lost on shutdown");
            return Ok(Self::memory(MemoryStore::new()));
        }

        let pool = create_pool(config).await?;
        check_connection(&pool).await?;

        let stats = get_pool_stats(&pool);
        tracing::info!(
            pool_size = stats.size,
            idle_connections = stats.idle,
            active_connections = stats.active(),
            schema_version = get_migration_version(&pool).await?,
            "Connected to PostgreSQL"
        );
        Ok(Self::postgres(pool))
    }
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    use tracing::Instrument;

    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .instrument(crate::db_span!("check_connection"))
        .await
        .map_err(|e| ListenerError::database(e, "Database connectivity check failed"))?;

    Ok(())
}
