//! Order business logic service
//!
//! Enqueueing, RDF availability, temp-file materialisation and cascading
//! delete of ingestion orders, separated from HTTP concerns.

use std::sync::Arc;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{info, instrument, warn};

use crate::domain::{NewOrder, Order, OrderId, RepositoryFilter};
use crate::errors::{ListenerError, Result};
use crate::storage::{AnalysisQuery, AnalysisRepository, OrderRepository, Repositories};

/// An order with its rating and statistic counts when they could be computed
#[derive(Debug, Clone, PartialEq)]
pub struct OrderOverview {
    pub order: Order,
    pub ratings: Option<i64>,
    pub statistics: Option<i64>,
}

/// Service for ingestion orders
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    analyses: Arc<dyn AnalysisRepository>,
}

impl OrderService {
    pub fn new(repositories: &Repositories) -> Self {
        Self { orders: repositories.orders.clone(), analyses: repositories.analyses.clone() }
    }

    /// Get an order or fail with NotFound
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.orders.get_order(id).await?.ok_or_else(|| ListenerError::order_not_found(id.as_i64()))
    }

    /// List all orders with rating and statistic counts.
    ///
    /// Counting is best effort: a failure for one order is logged and leaves
    /// that entry without counts.
    #[instrument(skip(self), name = "order_service.list_orders_with_stats")]
    pub async fn list_orders_with_stats(&self) -> Result<Vec<OrderOverview>> {
        let orders = self.orders.list_orders().await?;
        let mut overviews = Vec::with_capacity(orders.len());

        for order in orders {
            let summary = self.analyses.summarize(&AnalysisQuery::for_order(order.id)).await;
            let overview = match summary {
                Ok(summary) => OrderOverview {
                    order,
                    ratings: Some(summary.ratings.total),
                    statistics: Some(summary.statistics.total),
                },
                Err(error) => {
                    warn!(
                        order_id = %order.id,
                        error = %error,
                        "Failed to count analyses for order, returning bare entry"
                    );
                    OrderOverview { order, ratings: None, statistics: None }
                }
            };
            overviews.push(overview);
        }

        Ok(overviews)
    }

    /// Queue a repository for processing
    #[instrument(
        skip(self, filter),
        fields(owner = %owner, repository = %repository),
        name = "order_service.enqueue"
    )]
    pub async fn enqueue(
        &self,
        owner: &str,
        repository: &str,
        filter: RepositoryFilter,
    ) -> Result<OrderId> {
        if owner.trim().is_empty() {
            return Err(ListenerError::no_owner_specified());
        }
        if repository.trim().is_empty() {
            return Err(ListenerError::no_repository_specified());
        }
        if filter.are_all_filter_options_disabled() {
            return Err(ListenerError::all_filter_options_disabled());
        }

        let id = self.orders.insert_order(NewOrder::new(owner, repository, filter)).await?;
        info!(order_id = %id, "Queued repository for processing");
        Ok(id)
    }

    /// Whether the order finished processing and holds a non-empty RDF file
    #[instrument(skip(self), fields(order_id = %id), name = "order_service.is_rdf_file_available")]
    pub async fn is_rdf_file_available(&self, id: OrderId) -> Result<bool> {
        let order = self.get_order(id).await?;
        if !order.status.is_done() {
            return Ok(false);
        }

        Ok(self.orders.get_lob(id).await?.is_some_and(|lob| lob.has_rdf()))
    }

    /// Write the order's RDF file to an anonymous temp file rewound to the start
    #[instrument(skip(self), fields(order_id = %id), name = "order_service.get_temp_rdf_file")]
    pub async fn get_temp_rdf_file(&self, id: OrderId) -> Result<tokio::fs::File> {
        self.get_order(id).await?;

        let lob = self.orders.get_lob(id).await?.ok_or_else(|| {
            ListenerError::not_found(
                format!("No rdf entry found for github entry with id '{}'", id),
                "Wait until the repository was processed or queue it again",
            )
        })?;
        let rdf = lob
            .rdf_bytes()
            .ok_or_else(|| ListenerError::no_rdf_data_found(format!("order '{}'", id)))?;

        let file = tokio::task::spawn_blocking(tempfile::tempfile)
            .await
            .map_err(|e| ListenerError::internal(format!("Temp file task failed: {}", e)))?
            .map_err(|e| ListenerError::io(e, "Failed to create temp file for RDF download"))?;

        let mut file = tokio::fs::File::from_std(file);
        file.write_all(rdf)
            .await
            .map_err(|e| ListenerError::io(e, format!("Failed to write RDF of order '{}'", id)))?;
        file.flush().await.map_err(|e| ListenerError::io(e, "Failed to flush RDF temp file"))?;
        file.rewind().await.map_err(|e| ListenerError::io(e, "Failed to rewind RDF temp file"))?;

        Ok(file)
    }

    /// Delete the order and its large-object row
    #[instrument(skip(self), fields(order_id = %id), name = "order_service.complete_delete")]
    pub async fn complete_delete(&self, id: OrderId) -> Result<()> {
        if self.orders.delete_order_cascade(id).await? {
            info!(order_id = %id, "Deleted order and all connected data");
            Ok(())
        } else {
            Err(ListenerError::order_not_found(id.as_i64()))
        }
    }
}
