//! Rating DTOs for API response handling
//!
//! Responses are assembled from records the handler already fetched; the
//! breakdowns come from `services::statistics`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{AnalysisId, AnalysisRecord, Order, OrderId, OrderStatus, RatingFilter};
use crate::services::statistics::{self, GroupStats, MetricGroup, OrderGroup};
use crate::services::{MetricStatistics, OrderStatistics};

/// Per-metric summary inside an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub metric_id: String,
    pub metric_name: String,
    pub metric_version: i32,
    pub rating_count: i64,
    pub latest_created: Option<DateTime<Utc>>,
    pub has_rdf_data: bool,
}

impl From<MetricGroup> for MetricSummary {
    fn from(group: MetricGroup) -> Self {
        Self {
            metric_id: group.metric_id,
            metric_name: group.metric_name,
            metric_version: group.metric_version,
            rating_count: group.stats.count,
            latest_created: group.stats.latest,
            has_rdf_data: group.stats.has_rdf_data(),
        }
    }
}

/// `GET /ratings/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRatingsResponse {
    pub order_id: OrderId,
    pub owner: String,
    pub repository: String,
    pub status: OrderStatus,
    pub total_ratings: i64,
    pub unique_metrics: i64,
    pub metrics: Vec<MetricSummary>,
}

impl OrderRatingsResponse {
    pub fn new(order: Order, ratings: &[AnalysisRecord]) -> Self {
        let metrics: Vec<MetricSummary> =
            statistics::by_metric(ratings).into_iter().map(MetricSummary::from).collect();

        Self {
            order_id: order.id,
            owner: order.owner,
            repository: order.repository,
            status: order.status,
            total_ratings: ratings.len() as i64,
            unique_metrics: metrics.len() as i64,
            metrics,
        }
    }
}

/// A single record without its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDetail {
    pub id: AnalysisId,
    pub metric_id: String,
    pub metric_name: String,
    pub metric_version: i32,
    pub task_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub has_rdf_data: bool,
    pub filters: Option<RatingFilter>,
}

impl From<&AnalysisRecord> for RatingDetail {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            id: record.id,
            metric_id: record.metric_id.clone(),
            metric_name: record.metric_name.clone(),
            metric_version: record.metric_version,
            task_session_id: record.task_session_id.clone(),
            created_at: record.created_at,
            has_rdf_data: record.has_rdf(),
            filters: record.filter,
        }
    }
}

/// `GET /ratings/{id}/{metricId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDetailResponse {
    pub order_id: OrderId,
    pub owner: String,
    pub repository: String,
    pub metric_id: String,
    /// Name and version of the newest record
    pub metric_name: String,
    pub metric_version: i32,
    pub rating_count: i64,
    pub ratings: Vec<RatingDetail>,
}

impl MetricDetailResponse {
    /// `ratings` must be ordered newest first
    pub fn new(order: Order, metric_id: &str, ratings: &[AnalysisRecord]) -> Self {
        let (metric_name, metric_version) = ratings
            .first()
            .map(|newest| (newest.metric_name.clone(), newest.metric_version))
            .unwrap_or_default();

        Self {
            order_id: order.id,
            owner: order.owner,
            repository: order.repository,
            metric_id: metric_id.to_string(),
            metric_name,
            metric_version,
            rating_count: ratings.len() as i64,
            ratings: ratings.iter().map(RatingDetail::from).collect(),
        }
    }
}

/// Count, payload count and time range of a group of ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatsDto {
    pub rating_count: i64,
    pub with_rdf_data: i64,
    pub earliest_rating: Option<DateTime<Utc>>,
    pub latest_rating: Option<DateTime<Utc>>,
}

impl From<GroupStats> for GroupStatsDto {
    fn from(stats: GroupStats) -> Self {
        Self {
            rating_count: stats.count,
            with_rdf_data: stats.with_rdf_data,
            earliest_rating: stats.earliest,
            latest_rating: stats.latest,
        }
    }
}

/// `GET /ratings/{id}/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatsResponse {
    pub order_id: OrderId,
    pub owner: String,
    pub repository: String,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub counts: OrderStatistics,
    pub earliest_rating: Option<DateTime<Utc>>,
    pub latest_rating: Option<DateTime<Utc>>,
    pub task_sessions: BTreeMap<String, i64>,
    pub metric_breakdown: BTreeMap<String, GroupStatsDto>,
}

impl OrderStatsResponse {
    pub fn new(order: Order, counts: OrderStatistics, ratings: &[AnalysisRecord]) -> Self {
        let overall = statistics::overall(ratings);
        let metric_breakdown = statistics::by_metric(ratings)
            .into_iter()
            .map(|group| (group.metric_id, GroupStatsDto::from(group.stats)))
            .collect();

        Self {
            order_id: order.id,
            owner: order.owner,
            repository: order.repository,
            status: order.status,
            counts,
            earliest_rating: overall.earliest,
            latest_rating: overall.latest,
            task_sessions: statistics::task_session_counts(ratings),
            metric_breakdown,
        }
    }
}

/// One order inside a metric-wide view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetricInfo {
    pub order_id: OrderId,
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub rating_count: i64,
    pub has_rdf_data: bool,
    pub latest_rating: Option<DateTime<Utc>>,
}

impl From<OrderGroup> for OrderMetricInfo {
    fn from(group: OrderGroup) -> Self {
        Self {
            order_id: group.order_id,
            owner: group.owner,
            repository: group.repository,
            rating_count: group.stats.count,
            has_rdf_data: group.stats.has_rdf_data(),
            latest_rating: group.stats.latest,
        }
    }
}

fn newest_name_and_version(records: &[AnalysisRecord]) -> (String, i32) {
    records
        .iter()
        .max_by_key(|record| (record.created_at, record.id))
        .map(|record| (record.metric_name.clone(), record.metric_version))
        .unwrap_or_default()
}

/// `GET /ratings/metrics/{metricId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMetricResponse {
    pub metric_id: String,
    pub metric_name: String,
    pub metric_version: i32,
    pub total_ratings: i64,
    pub unique_orders: i64,
    pub orders: Vec<OrderMetricInfo>,
}

impl GlobalMetricResponse {
    pub fn new(metric_id: &str, ratings: &[AnalysisRecord]) -> Self {
        let (metric_name, metric_version) = newest_name_and_version(ratings);
        let orders: Vec<OrderMetricInfo> =
            statistics::by_order(ratings).into_iter().map(OrderMetricInfo::from).collect();

        Self {
            metric_id: metric_id.to_string(),
            metric_name,
            metric_version,
            total_ratings: ratings.len() as i64,
            unique_orders: orders.len() as i64,
            orders,
        }
    }
}

/// Per-order stats inside a metric-wide stats view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatsDto {
    pub owner: Option<String>,
    pub repository: Option<String>,
    #[serde(flatten)]
    pub stats: GroupStatsDto,
}

/// `GET /ratings/metrics/{metricId}/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMetricStatsResponse {
    pub metric_id: String,
    pub metric_name: String,
    pub metric_version: i32,
    #[serde(flatten)]
    pub counts: MetricStatistics,
    pub earliest_rating: Option<DateTime<Utc>>,
    pub latest_rating: Option<DateTime<Utc>>,
    pub task_sessions: BTreeMap<String, i64>,
    /// Keyed by order id
    pub order_breakdown: BTreeMap<String, OrderStatsDto>,
}

impl GlobalMetricStatsResponse {
    pub fn new(metric_id: &str, counts: MetricStatistics, ratings: &[AnalysisRecord]) -> Self {
        let (metric_name, metric_version) = newest_name_and_version(ratings);
        let overall = statistics::overall(ratings);
        let order_breakdown = statistics::by_order(ratings)
            .into_iter()
            .map(|group| {
                (
                    group.order_id.to_string(),
                    OrderStatsDto {
                        owner: group.owner,
                        repository: group.repository,
                        stats: GroupStatsDto::from(group.stats),
                    },
                )
            })
            .collect();

        Self {
            metric_id: metric_id.to_string(),
            metric_name,
            metric_version,
            counts,
            earliest_rating: overall.earliest,
            latest_rating: overall.latest,
            task_sessions: statistics::task_session_counts(ratings),
            order_breakdown,
        }
    }
}
