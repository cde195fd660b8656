//! Test database utilities for in-library tests.
//!
//! Each `TestDatabase` starts a fresh PostgreSQL container through
//! Testcontainers with all migrations applied. Only compiled for tests run
//! with the `postgres_tests` feature.

use crate::config::DatabaseConfig;
use crate::domain::{NewOrder, OrderId, RepositoryFilter};
use crate::storage::{create_pool, DbPool, OrderRepository, SqlxOrderRepository};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

/// A test database backed by a Testcontainers PostgreSQL instance.
///
/// The container is stopped when this struct is dropped, so keep it alive for
/// the duration of the test.
pub struct TestDatabase {
    pub pool: DbPool,
    _container: ContainerAsync<Postgres>,
}

impl TestDatabase {
    pub async fn new(prefix: &str) -> Self {
        let container = Postgres::default().start().await.unwrap_or_else(|e| {
            panic!("Failed to start PostgreSQL container for {}: {}", prefix, e)
        });

        let host = container
            .get_host()
            .await
            .unwrap_or_else(|e| panic!("Failed to get container host for {}: {}", prefix, e));

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .unwrap_or_else(|e| panic!("Failed to get container port for {}: {}", prefix, e));

        let config = DatabaseConfig {
            url: format!("postgresql://postgres:postgres@{}:{}/postgres", host, port),
            auto_migrate: true,
            max_connections: 5,
            min_connections: 1,
            ..Default::default()
        };

        let pool = create_pool(&config)
            .await
            .unwrap_or_else(|e| panic!("Failed to create test pool for {}: {}", prefix, e));

        Self { pool, _container: container }
    }

    /// Insert an order to satisfy analysis foreign keys
    pub async fn seed_order(&self, owner: &str, repository: &str) -> OrderId {
        SqlxOrderRepository::new(self.pool.clone())
            .insert_order(NewOrder::new(owner, repository, RepositoryFilter::DEFAULT))
            .await
            .unwrap_or_else(|e| panic!("Failed to seed order '{}/{}': {}", owner, repository, e))
    }
}
