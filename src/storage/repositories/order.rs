//! Order repository for repository ingestion orders
//!
//! Orders and their large-object rows are always created and deleted
//! together, each inside a single transaction.

use crate::domain::{NewOrder, Order, OrderId, OrderLob, OrderStatus, RepositoryFilter};
use crate::errors::{ListenerError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use bytes::Bytes;
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct OrderRow {
    pub id: i64,
    pub owner_name: String,
    pub repository_name: String,
    pub status: String,
    pub number_of_tries: i32,
    pub filter: Json<RepositoryFilter>,
}

impl TryFrom<OrderRow> for Order {
    type Error = ListenerError;

    fn try_from(row: OrderRow) -> Result<Self> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            ListenerError::internal(format!("Invalid status on order {}: {}", row.id, e))
        })?;

        Ok(Order {
            id: OrderId::new(row.id),
            owner: row.owner_name,
            repository: row.repository_name,
            status,
            number_of_tries: row.number_of_tries,
            filter: row.filter.0,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct OrderLobRow {
    pub order_id: i64,
    pub rdf_file: Option<Vec<u8>>,
}

impl From<OrderLobRow> for OrderLob {
    fn from(row: OrderLobRow) -> Self {
        OrderLob { order_id: OrderId::new(row.order_id), rdf_file: row.rdf_file.map(Bytes::from) }
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Get an order by id
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// List all orders, oldest first
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Create an order with status RECEIVED and an empty large-object row
    async fn insert_order(&self, order: NewOrder) -> Result<OrderId>;

    /// Get the large-object row of an order
    async fn get_lob(&self, id: OrderId) -> Result<Option<OrderLob>>;

    /// Delete the large-object row and the order in one transaction.
    /// Returns false and changes nothing when the order does not exist.
    async fn delete_order_cascade(&self, id: OrderId) -> Result<bool>;

    /// Record processing progress reported by the pipeline
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        number_of_tries: i32,
    ) -> Result<bool>;

    /// Store the generated RDF file of an order
    async fn store_rdf_file(&self, id: OrderId, rdf_file: Bytes) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct SqlxOrderRepository {
    pool: DbPool,
}

impl SqlxOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for SqlxOrderRepository {
    #[instrument(skip(self), fields(order_id = %id), name = "db_get_order")]
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query_as::<sqlx::Postgres, OrderRow>(
            "SELECT id, owner_name, repository_name, status, number_of_tries, filter
             FROM github_repository_order WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, order_id = %id, "Failed to get order");
            ListenerError::database(e, format!("Failed to get order '{}'", id))
        })?;

        row.map(Order::try_from).transpose()
    }

    #[instrument(skip(self), name = "db_list_orders")]
    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<sqlx::Postgres, OrderRow>(
            "SELECT id, owner_name, repository_name, status, number_of_tries, filter
             FROM github_repository_order ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list orders");
            ListenerError::database(e, "Failed to list orders")
        })?;

        rows.into_iter().map(Order::try_from).collect()
    }

    #[instrument(
        skip(self, order),
        fields(owner = %order.owner, repository = %order.repository),
        name = "db_insert_order"
    )]
    async fn insert_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ListenerError::database(e, "Failed to begin order transaction"))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO github_repository_order
                (owner_name, repository_name, status, number_of_tries, filter)
             VALUES ($1, $2, $3, 0, $4) RETURNING id",
        )
        .bind(&order.owner)
        .bind(&order.repository)
        .bind(OrderStatus::Received.as_str())
        .bind(Json(order.filter))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                owner = %order.owner,
                repository = %order.repository,
                "Failed to insert order"
            );
            ListenerError::database(
                e,
                format!("Failed to create order for '{}/{}'", order.owner, order.repository),
            )
        })?;

        sqlx::query(
            "INSERT INTO github_repository_order_lobs (order_id, rdf_file) VALUES ($1, NULL)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            ListenerError::database(
                e,
                format!("Failed to create large object row for order '{}'", id),
            )
        })?;

        tx.commit()
            .await
            .map_err(|e| ListenerError::database(e, "Failed to commit order transaction"))?;

        tracing::info!(
            order_id = id,
            owner = %order.owner,
            repository = %order.repository,
            "Created new order"
        );
        Ok(OrderId::new(id))
    }

    #[instrument(skip(self), fields(order_id = %id), name = "db_get_order_lob")]
    async fn get_lob(&self, id: OrderId) -> Result<Option<OrderLob>> {
        let row = sqlx::query_as::<sqlx::Postgres, OrderLobRow>(
            "SELECT order_id, rdf_file FROM github_repository_order_lobs WHERE order_id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, order_id = %id, "Failed to get order large object");
            ListenerError::database(e, format!("Failed to get large object for order '{}'", id))
        })?;

        Ok(row.map(OrderLob::from))
    }

    #[instrument(skip(self), fields(order_id = %id), name = "db_delete_order_cascade")]
    async fn delete_order_cascade(&self, id: OrderId) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ListenerError::database(e, "Failed to begin delete transaction"))?;

        sqlx::query("DELETE FROM github_repository_order_lobs WHERE order_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                ListenerError::database(
                    e,
                    format!("Failed to delete large object of order '{}'", id),
                )
            })?;

        let result = sqlx::query("DELETE FROM github_repository_order WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, order_id = %id, "Failed to delete order");
                ListenerError::database(e, format!("Failed to delete order '{}'", id))
            })?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| ListenerError::database(e, "Failed to roll back delete transaction"))?;
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(|e| ListenerError::database(e, "Failed to commit delete transaction"))?;

        tracing::info!(order_id = %id, "Deleted order with its large object");
        Ok(true)
    }

    #[instrument(
        skip(self),
        fields(order_id = %id, status = %status),
        name = "db_update_order_status"
    )]
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        number_of_tries: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE github_repository_order SET status = $2, number_of_tries = $3 WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(status.as_str())
        .bind(number_of_tries)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            ListenerError::database(e, format!("Failed to update status of order '{}'", id))
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        skip(self, rdf_file),
        fields(order_id = %id, bytes = rdf_file.len()),
        name = "db_store_order_rdf"
    )]
    async fn store_rdf_file(&self, id: OrderId, rdf_file: Bytes) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE github_repository_order_lobs SET rdf_file = $2 WHERE order_id = $1",
        )
        .bind(id.as_i64())
        .bind(rdf_file.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            ListenerError::database(e, format!("Failed to store RDF file of order '{}'", id))
        })?;

        Ok(result.rows_affected() > 0)
    }
}
