//! Analysis repository for rating, statistic and expert records
//!
//! Listing, distinct-value and summary queries share one filter description
//! (`AnalysisQuery`) so the same predicate is applied whether records are
//! materialised or only counted. RDF payload bytes are selected only when a
//! query asks for them.

use crate::domain::{
    AnalysisId, AnalysisKind, AnalysisRecord, NewAnalysisRecord, OrderId, OrderIdentity,
    RatingFilter, RdfPayload,
};
use crate::errors::{ListenerError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::instrument;

/// Filter over analysis records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisQuery {
    pub order_id: Option<OrderId>,
    pub metric_id: Option<String>,
    pub kind: Option<AnalysisKind>,
    /// Only records whose payload is present
    pub rdf_only: bool,
    /// Load payload bytes instead of a presence flag
    pub with_payload: bool,
}

impl AnalysisQuery {
    /// Every record in the system
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_order(order_id: OrderId) -> Self {
        Self { order_id: Some(order_id), ..Self::default() }
    }

    pub fn for_metric(metric_id: impl Into<String>) -> Self {
        Self { metric_id: Some(metric_id.into()), ..Self::default() }
    }

    pub fn metric(mut self, metric_id: impl Into<String>) -> Self {
        self.metric_id = Some(metric_id.into());
        self
    }

    pub fn kind(mut self, kind: AnalysisKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn rdf_only(mut self) -> Self {
        self.rdf_only = true;
        self
    }

    pub fn with_payload(mut self) -> Self {
        self.with_payload = true;
        self
    }

    /// In-process evaluation of the same predicate the SQL query applies
    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        self.order_id.map_or(true, |id| record.order_id == id)
            && self.metric_id.as_deref().map_or(true, |metric| record.metric_id == metric)
            && self.kind.map_or(true, |kind| record.kind == kind)
            && (!self.rdf_only || record.has_rdf())
    }
}

/// Record and payload counts of one analysis kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub total: i64,
    pub with_rdf: i64,
}

/// Aggregate counts over the records selected by an `AnalysisQuery`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub ratings: KindCounts,
    pub statistics: KindCounts,
    pub experts: KindCounts,
    pub distinct_metrics: i64,
    pub distinct_orders: i64,
}

#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Records matching the query, newest first
    async fn find(&self, query: &AnalysisQuery) -> Result<Vec<AnalysisRecord>>;

    /// Per-kind and distinct counts computed by the store
    async fn summarize(&self, query: &AnalysisQuery) -> Result<AnalysisSummary>;

    /// Distinct metric ids among matching records, sorted
    async fn distinct_metric_ids(&self, query: &AnalysisQuery) -> Result<Vec<String>>;

    /// Distinct order ids among matching records, sorted
    async fn distinct_order_ids(&self, query: &AnalysisQuery) -> Result<Vec<OrderId>>;

    /// A single record, optionally with its payload bytes
    async fn get_record(&self, id: AnalysisId, with_payload: bool)
        -> Result<Option<AnalysisRecord>>;

    /// Store a record produced by the pipeline
    async fn insert_record(&self, record: NewAnalysisRecord) -> Result<AnalysisId>;
}

const RDF_PRESENT: &str = "(a.rdf_blob IS NOT NULL AND octet_length(a.rdf_blob) > 0)";

#[derive(Debug, Clone, FromRow)]
struct AnalysisRow {
    pub id: i64,
    pub order_id: i64,
    pub owner_name: Option<String>,
    pub repository_name: Option<String>,
    pub analysis_type: String,
    pub metric_id: String,
    pub metric_name: String,
    pub metric_version: i32,
    pub task_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub rating_filter: Option<Json<RatingFilter>>,
    pub rdf_blob: Option<Vec<u8>>,
    pub has_rdf: bool,
}

impl AnalysisRow {
    fn into_record(self, with_payload: bool) -> Result<AnalysisRecord> {
        let kind = self.analysis_type.parse::<AnalysisKind>().map_err(|e| {
            ListenerError::internal(format!("Invalid type on analysis record {}: {}", self.id, e))
        })?;

        let order = match (self.owner_name, self.repository_name) {
            (Some(owner), Some(repository)) => Some(OrderIdentity { owner, repository }),
            _ => None,
        };

        let rdf = if with_payload {
            RdfPayload::from_column(self.rdf_blob)
        } else {
            RdfPayload::from_presence(self.has_rdf)
        };

        Ok(AnalysisRecord {
            id: AnalysisId::new(self.id),
            order_id: OrderId::new(self.order_id),
            order,
            kind,
            metric_id: self.metric_id,
            metric_name: self.metric_name,
            metric_version: self.metric_version,
            task_session_id: self.task_session_id,
            created_at: self.created_at,
            filter: self.rating_filter.map(|filter| filter.0),
            rdf,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct SummaryRow {
    pub rating_total: i64,
    pub rating_rdf: i64,
    pub statistic_total: i64,
    pub statistic_rdf: i64,
    pub expert_total: i64,
    pub expert_rdf: i64,
    pub distinct_metrics: i64,
    pub distinct_orders: i64,
}

impl From<SummaryRow> for AnalysisSummary {
    fn from(row: SummaryRow) -> Self {
        AnalysisSummary {
            ratings: KindCounts { total: row.rating_total, with_rdf: row.rating_rdf },
            statistics: KindCounts { total: row.statistic_total, with_rdf: row.statistic_rdf },
            experts: KindCounts { total: row.expert_total, with_rdf: row.expert_rdf },
            distinct_metrics: row.distinct_metrics,
            distinct_orders: row.distinct_orders,
        }
    }
}

fn select_records(with_payload: bool) -> QueryBuilder<'static, Postgres> {
    let payload = if with_payload { "a.rdf_blob" } else { "NULL::BYTEA AS rdf_blob" };
    QueryBuilder::new(format!(
        "SELECT a.id, a.order_id, o.owner_name, o.repository_name, a.analysis_type,
                a.metric_id, a.metric_name, a.metric_version, a.task_session_id,
                a.created_at, a.rating_filter, {payload}, {RDF_PRESENT} AS has_rdf
         FROM github_repository_order_analysis a
         LEFT JOIN github_repository_order o ON o.id = a.order_id"
    ))
}

fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &AnalysisQuery) {
    builder.push(" WHERE TRUE");
    if let Some(order_id) = query.order_id {
        builder.push(" AND a.order_id = ").push_bind(order_id.as_i64());
    }
    if let Some(metric_id) = &query.metric_id {
        builder.push(" AND a.metric_id = ").push_bind(metric_id.clone());
    }
    if let Some(kind) = query.kind {
        builder.push(" AND a.analysis_type = ").push_bind(kind.as_str());
    }
    if query.rdf_only {
        builder.push(" AND ").push(RDF_PRESENT);
    }
}

#[derive(Debug, Clone)]
pub struct SqlxAnalysisRepository {
    pool: DbPool,
}

impl SqlxAnalysisRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisRepository for SqlxAnalysisRepository {
    #[instrument(skip(self), name = "db_find_analyses")]
    async fn find(&self, query: &AnalysisQuery) -> Result<Vec<AnalysisRecord>> {
        let mut builder = select_records(query.with_payload);
        push_filters(&mut builder, query);
        builder.push(" ORDER BY a.created_at DESC, a.id DESC");

        let rows = builder.build_query_as::<AnalysisRow>().fetch_all(&self.pool).await.map_err(
            |e| {
                tracing::error!(error = %e, ?query, "Failed to query analysis records");
                ListenerError::database(e, "Failed to query analysis records")
            },
        )?;

        rows.into_iter().map(|row| row.into_record(query.with_payload)).collect()
    }

    #[instrument(skip(self), name = "db_summarize_analyses")]
    async fn summarize(&self, query: &AnalysisQuery) -> Result<AnalysisSummary> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT
                COUNT(*) FILTER (WHERE a.analysis_type = 'RATING') AS rating_total,
                COUNT(*) FILTER (WHERE a.analysis_type = 'RATING' AND {RDF_PRESENT}) AS rating_rdf,
                COUNT(*) FILTER (WHERE a.analysis_type = 'STATISTIC') AS statistic_total,
                COUNT(*) FILTER (WHERE a.analysis_type = 'STATISTIC' AND {RDF_PRESENT})
                    AS statistic_rdf,
                COUNT(*) FILTER (WHERE a.analysis_type = 'EXPERT') AS expert_total,
                COUNT(*) FILTER (WHERE a.analysis_type = 'EXPERT' AND {RDF_PRESENT}) AS expert_rdf,
                COUNT(DISTINCT a.metric_id) AS distinct_metrics,
                COUNT(DISTINCT a.order_id) AS distinct_orders
             FROM github_repository_order_analysis a"
        ));
        push_filters(&mut builder, query);

        let row = builder.build_query_as::<SummaryRow>().fetch_one(&self.pool).await.map_err(
            |e| {
                tracing::error!(error = %e, ?query, "Failed to summarize analysis records");
                ListenerError::database(e, "Failed to summarize analysis records")
            },
        )?;

        Ok(row.into())
    }

    #[instrument(skip(self), name = "db_distinct_metric_ids")]
    async fn distinct_metric_ids(&self, query: &AnalysisQuery) -> Result<Vec<String>> {
        let mut builder = QueryBuilder::new(
            "SELECT DISTINCT a.metric_id FROM github_repository_order_analysis a",
        );
        push_filters(&mut builder, query);
        builder.push(" ORDER BY a.metric_id");

        builder
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ListenerError::database(e, "Failed to query distinct metric ids"))
    }

    #[instrument(skip(self), name = "db_distinct_order_ids")]
    async fn distinct_order_ids(&self, query: &AnalysisQuery) -> Result<Vec<OrderId>> {
        let mut builder =
            QueryBuilder::new("SELECT DISTINCT a.order_id FROM github_repository_order_analysis a");
        push_filters(&mut builder, query);
        builder.push(" ORDER BY a.order_id");

        let ids = builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ListenerError::database(e, "Failed to query distinct order ids"))?;

        Ok(ids.into_iter().map(OrderId::new).collect())
    }

    #[instrument(skip(self), fields(analysis_id = %id), name = "db_get_analysis")]
    async fn get_record(
        &self,
        id: AnalysisId,
        with_payload: bool,
    ) -> Result<Option<AnalysisRecord>> {
        let mut builder = select_records(with_payload);
        builder.push(" WHERE a.id = ").push_bind(id.as_i64());

        let row = builder.build_query_as::<AnalysisRow>().fetch_optional(&self.pool).await.map_err(
            |e| {
                tracing::error!(error = %e, analysis_id = %id, "Failed to get analysis record");
                ListenerError::database(e, format!("Failed to get analysis record '{}'", id))
            },
        )?;

        row.map(|row| row.into_record(with_payload)).transpose()
    }

    #[instrument(
        skip(self, record),
        fields(order_id = %record.order_id, kind = %record.kind, metric_id = %record.metric_id),
        name = "db_insert_analysis"
    )]
    async fn insert_record(&self, record: NewAnalysisRecord) -> Result<AnalysisId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO github_repository_order_analysis
                (order_id, analysis_type, metric_id, metric_name, metric_version,
                 task_session_id, rdf_blob, rating_filter)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(record.order_id.as_i64())
        .bind(record.kind.as_str())
        .bind(&record.metric_id)
        .bind(&record.metric_name)
        .bind(record.metric_version)
        .bind(&record.task_session_id)
        .bind(record.rdf.as_ref().map(|bytes| bytes.to_vec()))
        .bind(record.filter.map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                order_id = %record.order_id,
                "Failed to insert analysis record"
            );
            ListenerError::database(
                e,
                format!("Failed to store analysis record for order '{}'", record.order_id),
            )
        })?;

        Ok(AnalysisId::new(id))
    }
}
