//! Ratings and analysis business logic service
//!
//! Order-scoped queries check that the order exists before the analysis
//! store is touched. Counting is delegated to the store's aggregate query.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{AnalysisId, AnalysisKind, AnalysisRecord, Order, OrderId};
use crate::errors::{ListenerError, Result};
use crate::services::rdf_export::{self, DownloadKind, RdfDownload};
use crate::storage::{AnalysisQuery, AnalysisRepository, OrderRepository, Repositories};

/// Record counts of one order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total_ratings: i64,
    pub total_statistics: i64,
    pub total_experts: i64,
    pub unique_metrics: i64,
    pub ratings_with_rdf: i64,
    pub statistics_with_rdf: i64,
    pub experts_with_rdf: i64,
}

/// Record counts of one metric across all orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStatistics {
    pub total_ratings: i64,
    pub total_statistics: i64,
    pub unique_orders: i64,
    pub ratings_with_rdf: i64,
    pub statistics_with_rdf: i64,
}

impl MetricStatistics {
    pub fn is_empty(&self) -> bool {
        self.total_ratings == 0 && self.total_statistics == 0
    }
}

/// An assembled export together with its attachment filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfExport {
    pub download: RdfDownload,
    pub filename: String,
}

/// Service for rating, statistic and expert records
#[derive(Clone)]
pub struct RatingsService {
    orders: Arc<dyn OrderRepository>,
    analyses: Arc<dyn AnalysisRepository>,
}

impl RatingsService {
    pub fn new(repositories: &Repositories) -> Self {
        Self { orders: repositories.orders.clone(), analyses: repositories.analyses.clone() }
    }

    /// Get an order or fail with NotFound
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.orders.get_order(id).await?.ok_or_else(|| ListenerError::order_not_found(id.as_i64()))
    }

    // === Order scope ===

    /// Records of an order, optionally narrowed to one kind. Empty is not an error.
    #[instrument(skip(self), name = "ratings_service.order_analyses")]
    pub async fn order_analyses(
        &self,
        order_id: OrderId,
        kind: Option<AnalysisKind>,
        rdf_only: bool,
    ) -> Result<Vec<AnalysisRecord>> {
        self.get_order(order_id).await?;
        self.analyses.find(&scoped(AnalysisQuery::for_order(order_id), kind, rdf_only)).await
    }

    /// Records of an order for one metric, newest first. Empty is NotFound.
    #[instrument(skip(self), name = "ratings_service.order_metric_analyses")]
    pub async fn order_metric_analyses(
        &self,
        order_id: OrderId,
        metric_id: &str,
        kind: Option<AnalysisKind>,
        rdf_only: bool,
    ) -> Result<Vec<AnalysisRecord>> {
        self.get_order(order_id).await?;
        let query = scoped(AnalysisQuery::for_order(order_id).metric(metric_id), kind, rdf_only);
        let records = self.analyses.find(&query).await?;

        if records.is_empty() {
            return Err(ListenerError::order_metric_not_found(order_id.as_i64(), metric_id));
        }
        Ok(records)
    }

    /// Distinct metric ids with records for an order
    pub async fn order_metric_ids(&self, order_id: OrderId) -> Result<Vec<String>> {
        self.get_order(order_id).await?;
        self.analyses.distinct_metric_ids(&AnalysisQuery::for_order(order_id)).await
    }

    #[instrument(skip(self), name = "ratings_service.order_statistics")]
    pub async fn order_statistics(&self, order_id: OrderId) -> Result<OrderStatistics> {
        self.get_order(order_id).await?;
        let summary = self.analyses.summarize(&AnalysisQuery::for_order(order_id)).await?;

        Ok(OrderStatistics {
            total_ratings: summary.ratings.total,
            total_statistics: summary.statistics.total,
            total_experts: summary.experts.total,
            unique_metrics: summary.distinct_metrics,
            ratings_with_rdf: summary.ratings.with_rdf,
            statistics_with_rdf: summary.statistics.with_rdf,
            experts_with_rdf: summary.experts.with_rdf,
        })
    }

    // === Metric scope ===

    /// Records of a metric across all orders. Empty is not an error.
    #[instrument(skip(self), name = "ratings_service.metric_analyses")]
    pub async fn metric_analyses(
        &self,
        metric_id: &str,
        kind: Option<AnalysisKind>,
        rdf_only: bool,
    ) -> Result<Vec<AnalysisRecord>> {
        self.analyses.find(&scoped(AnalysisQuery::for_metric(metric_id), kind, rdf_only)).await
    }

    /// Ratings of a metric across all orders. Empty is NotFound.
    pub async fn ratings_by_metric(&self, metric_id: &str) -> Result<Vec<AnalysisRecord>> {
        let ratings = self.metric_analyses(metric_id, Some(AnalysisKind::Rating), false).await?;
        if ratings.is_empty() {
            return Err(ListenerError::metric_not_found(metric_id));
        }
        Ok(ratings)
    }

    /// Distinct orders with records for a metric
    pub async fn metric_order_ids(&self, metric_id: &str) -> Result<Vec<OrderId>> {
        self.analyses.distinct_order_ids(&AnalysisQuery::for_metric(metric_id)).await
    }

    /// Counts for a metric; an unknown metric yields all zeros
    #[instrument(skip(self), name = "ratings_service.metric_statistics")]
    pub async fn metric_statistics(&self, metric_id: &str) -> Result<MetricStatistics> {
        let summary = self.analyses.summarize(&AnalysisQuery::for_metric(metric_id)).await?;

        Ok(MetricStatistics {
            total_ratings: summary.ratings.total,
            total_statistics: summary.statistics.total,
            unique_orders: summary.distinct_orders,
            ratings_with_rdf: summary.ratings.with_rdf,
            statistics_with_rdf: summary.statistics.with_rdf,
        })
    }

    // === Global ===

    pub async fn all_metric_ids(&self) -> Result<Vec<String>> {
        self.analyses.distinct_metric_ids(&AnalysisQuery::all()).await
    }

    pub async fn order_ids_with_experts(&self) -> Result<Vec<OrderId>> {
        self.analyses.distinct_order_ids(&AnalysisQuery::all().kind(AnalysisKind::Expert)).await
    }

    /// A single record and its payload. NotFound if either is missing.
    #[instrument(skip(self), name = "ratings_service.analysis_rdf")]
    pub async fn analysis_rdf(&self, id: AnalysisId) -> Result<(AnalysisRecord, Bytes)> {
        let record = self
            .analyses
            .get_record(id, true)
            .await?
            .ok_or_else(|| ListenerError::analysis_not_found(id.as_i64()))?;

        let payload = record
            .rdf
            .bytes()
            .cloned()
            .ok_or_else(|| ListenerError::no_rdf_data_found(format!("analysis record '{}'", id)))?;

        Ok((record, payload))
    }

    // === Export ===

    /// Export the payloads of an order, optionally narrowed to one metric
    #[instrument(skip(self), name = "ratings_service.export_order")]
    pub async fn export_order(
        &self,
        order_id: OrderId,
        kind: Option<AnalysisKind>,
        metric_id: Option<&str>,
    ) -> Result<RdfExport> {
        let order = self.get_order(order_id).await?;

        let mut query = scoped(AnalysisQuery::for_order(order_id), kind, true).with_payload();
        let download_kind = match metric_id {
            Some(metric_id) => {
                query = query.metric(metric_id);
                DownloadKind::OrderMetric
            }
            None => match kind {
                Some(AnalysisKind::Rating) => DownloadKind::Order,
                Some(AnalysisKind::Statistic) => DownloadKind::Statistics,
                Some(AnalysisKind::Expert) => DownloadKind::Experts,
                None => DownloadKind::Analyses,
            },
        };

        let records = self.analyses.find(&query).await?;
        let hint = match metric_id {
            Some(metric_id) => format!("order_{}_metric_{}", order_id, metric_id),
            None => format!("order_{}", order_id),
        };
        let download = rdf_export::create_rdf_download(&records, &hint);
        let filename = rdf_export::download_filename(
            download_kind,
            Some(order_id),
            metric_id,
            Some(&order.identity()),
        );

        debug!(
            order_id = %order_id,
            file_count = download.file_count,
            filename = %filename,
            "Prepared order RDF export"
        );
        Ok(RdfExport { download, filename })
    }

    /// Export the payloads of a metric across all orders
    #[instrument(skip(self), name = "ratings_service.export_metric")]
    pub async fn export_metric(
        &self,
        metric_id: &str,
        kind: Option<AnalysisKind>,
    ) -> Result<RdfExport> {
        let query = scoped(AnalysisQuery::for_metric(metric_id), kind, true).with_payload();
        let records = self.analyses.find(&query).await?;

        let download_kind = match kind {
            Some(AnalysisKind::Rating) => DownloadKind::Metric,
            Some(AnalysisKind::Statistic) => DownloadKind::Statistics,
            Some(AnalysisKind::Expert) => DownloadKind::Experts,
            None => DownloadKind::Analyses,
        };

        let download = rdf_export::create_rdf_download(&records, &format!("metric_{}", metric_id));
        let filename = rdf_export::download_filename(download_kind, None, Some(metric_id), None);

        debug!(
            metric_id,
            file_count = download.file_count,
            filename = %filename,
            "Prepared metric RDF export"
        );
        Ok(RdfExport { download, filename })
    }
}

fn scoped(query: AnalysisQuery, kind: Option<AnalysisKind>, rdf_only: bool) -> AnalysisQuery {
    let query = match kind {
        Some(kind) => query.kind(kind),
        None => query,
    };
    if rdf_only {
        query.rdf_only()
    } else {
        query
    }
}
