//! Rating, statistic and expert HTTP handlers
//!
//! Order-scoped routes live under `/ratings/{id}`, metric-scoped routes under
//! `/ratings/metrics/{metricId}`. Downloads answer 204 when no record in
//! scope carries an RDF payload.

use axum::{
    body::Body,
    extract::{Path, State},
    response::Response,
    Json,
};
use tracing::instrument;

use crate::api::{
    dto::{
        GlobalMetricResponse, GlobalMetricStatsResponse, MetricDetailResponse,
        OrderRatingsResponse, OrderStatsResponse, RatingDetail,
    },
    error::ApiError,
    routes::ApiState,
    util::{parse_analysis_id, parse_order_id, turtle_attachment, turtle_download},
};
use crate::domain::{AnalysisKind, OrderId};
use crate::services::RdfExport;

/// Filename of a single record download
const SINGLE_RATING_FILENAME: &str = "metric-rating.ttl";

fn export_response(state: &ApiState, kind: AnalysisKind, export: RdfExport) -> Response {
    let bytes = export.download.content.as_ref().map_or(0, |content| content.len());
    state.metrics.record_rdf_export(kind.label(), export.download.file_count, bytes);
    turtle_download(export.download.content, &export.filename)
}

// === Order scope ===

/// Ratings of an order grouped by metric
#[instrument(skip(state), fields(order_id = %id))]
pub async fn order_ratings_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<OrderRatingsResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = state.ratings.get_order(order_id).await?;
    let ratings = state.ratings.order_analyses(order_id, Some(AnalysisKind::Rating), false).await?;

    Ok(Json(OrderRatingsResponse::new(order, &ratings)))
}

/// Plain list of the ratings of an order
#[instrument(skip(state), fields(order_id = %id))]
pub async fn order_rating_list_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RatingDetail>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let ratings = state.ratings.order_analyses(order_id, Some(AnalysisKind::Rating), false).await?;
    Ok(Json(ratings.iter().map(RatingDetail::from).collect()))
}

/// Ratings of one metric within an order, newest first
#[instrument(skip(state), fields(order_id = %id, metric_id = %metric_id))]
pub async fn order_metric_ratings_handler(
    State(state): State<ApiState>,
    Path((id, metric_id)): Path<(String, String)>,
) -> Result<Json<MetricDetailResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = state.ratings.get_order(order_id).await?;
    let ratings = state
        .ratings
        .order_metric_analyses(order_id, &metric_id, Some(AnalysisKind::Rating), false)
        .await?;

    Ok(Json(MetricDetailResponse::new(order, &metric_id, &ratings)))
}

#[instrument(skip(state), fields(order_id = %id))]
pub async fn order_stats_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<OrderStatsResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let order = state.ratings.get_order(order_id).await?;
    let counts = state.ratings.order_statistics(order_id).await?;
    let ratings = state.ratings.order_analyses(order_id, Some(AnalysisKind::Rating), false).await?;

    Ok(Json(OrderStatsResponse::new(order, counts, &ratings)))
}

#[instrument(skip(state), fields(order_id = %id))]
pub async fn order_metric_ids_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    Ok(Json(state.ratings.order_metric_ids(order_id).await?))
}

#[instrument(skip(state), fields(order_id = %id))]
pub async fn download_order_ratings_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&id)?;
    let export = state.ratings.export_order(order_id, Some(AnalysisKind::Rating), None).await?;
    Ok(export_response(&state, AnalysisKind::Rating, export))
}

#[instrument(skip(state), fields(order_id = %id, metric_id = %metric_id))]
pub async fn download_order_metric_ratings_handler(
    State(state): State<ApiState>,
    Path((id, metric_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&id)?;
    let export = state
        .ratings
        .export_order(order_id, Some(AnalysisKind::Rating), Some(&metric_id))
        .await?;
    Ok(export_response(&state, AnalysisKind::Rating, export))
}

#[instrument(skip(state), fields(order_id = %id))]
pub async fn download_order_experts_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&id)?;
    let export = state.ratings.export_order(order_id, Some(AnalysisKind::Expert), None).await?;
    Ok(export_response(&state, AnalysisKind::Expert, export))
}

// === Metric scope ===

#[instrument(skip(state))]
pub async fn all_metric_ids_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.ratings.all_metric_ids().await?))
}

/// Ratings of a metric across all orders
#[instrument(skip(state), fields(metric_id = %metric_id))]
pub async fn metric_ratings_handler(
    State(state): State<ApiState>,
    Path(metric_id): Path<String>,
) -> Result<Json<GlobalMetricResponse>, ApiError> {
    let ratings = state.ratings.ratings_by_metric(&metric_id).await?;
    Ok(Json(GlobalMetricResponse::new(&metric_id, &ratings)))
}

#[instrument(skip(state), fields(metric_id = %metric_id))]
pub async fn metric_stats_handler(
    State(state): State<ApiState>,
    Path(metric_id): Path<String>,
) -> Result<Json<GlobalMetricStatsResponse>, ApiError> {
    let ratings = state.ratings.ratings_by_metric(&metric_id).await?;
    let counts = state.ratings.metric_statistics(&metric_id).await?;
    Ok(Json(GlobalMetricStatsResponse::new(&metric_id, counts, &ratings)))
}

#[instrument(skip(state), fields(metric_id = %metric_id))]
pub async fn metric_order_ids_handler(
    State(state): State<ApiState>,
    Path(metric_id): Path<String>,
) -> Result<Json<Vec<OrderId>>, ApiError> {
    Ok(Json(state.ratings.metric_order_ids(&metric_id).await?))
}

#[instrument(skip(state), fields(metric_id = %metric_id))]
pub async fn download_metric_ratings_handler(
    State(state): State<ApiState>,
    Path(metric_id): Path<String>,
) -> Result<Response, ApiError> {
    let export = state.ratings.export_metric(&metric_id, Some(AnalysisKind::Rating)).await?;
    Ok(export_response(&state, AnalysisKind::Rating, export))
}

// === Global ===

#[instrument(skip(state))]
pub async fn expert_order_ids_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<OrderId>>, ApiError> {
    Ok(Json(state.ratings.order_ids_with_experts().await?))
}

/// Payload of a single analysis record
#[instrument(skip(state), fields(analysis_id = %id))]
pub async fn download_single_rating_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let analysis_id = parse_analysis_id(&id)?;
    let (_, payload) = state.ratings.analysis_rdf(analysis_id).await?;
    Ok(turtle_attachment(Body::from(payload), SINGLE_RATING_FILENAME))
}
