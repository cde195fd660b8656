//! Ingestion order HTTP handlers
//!
//! Listing, enqueueing, RDF availability and download, and cascading delete
//! of orders. All business rules live in `OrderService`.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::api::{
    dto::{OrderEntryResponse, QueueRequest, QueueWithFilterRequest, SavedResponse},
    error::ApiError,
    routes::ApiState,
    util::{json_body, parse_order_id, turtle_attachment},
};
use crate::domain::RepositoryFilter;
use crate::errors::ListenerError;

/// Filename of a full order download
const ORDER_RDF_FILENAME: &str = "rdf.ttl";

pub const RDF_AVAILABLE: &str = "available";
pub const RDF_NOT_AVAILABLE: &str = "not available";

/// List all orders with their rating and statistic counts
#[instrument(skip(state))]
pub async fn list_orders_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<OrderEntryResponse>>, ApiError> {
    let overviews = state.orders.list_orders_with_stats().await?;
    Ok(Json(overviews.into_iter().map(OrderEntryResponse::from).collect()))
}

/// Queue a repository with every filter option enabled
#[instrument(skip(state, payload))]
pub async fn queue_handler(
    State(state): State<ApiState>,
    payload: Result<Json<QueueRequest>, JsonRejection>,
) -> Result<Json<SavedResponse>, ApiError> {
    let body = json_body(payload)?;

    let id = state
        .orders
        .enqueue(
            body.owner.as_deref().unwrap_or_default(),
            body.repository.as_deref().unwrap_or_default(),
            RepositoryFilter::DEFAULT,
        )
        .await?;

    state.metrics.record_order_enqueued();
    Ok(Json(SavedResponse { id }))
}

/// Queue a repository with explicit filter options
#[instrument(skip(state, payload))]
pub async fn queue_with_filter_handler(
    State(state): State<ApiState>,
    payload: Result<Json<QueueWithFilterRequest>, JsonRejection>,
) -> Result<Json<SavedResponse>, ApiError> {
    let body = json_body(payload)?;

    let owner = body.owner.as_deref().unwrap_or_default();
    let repository = body.repository.as_deref().unwrap_or_default();
    let filter = body.repository_filter.unwrap_or(RepositoryFilter::DISABLED);

    let id = state.orders.enqueue(owner, repository, filter).await?;

    state.metrics.record_order_enqueued();
    Ok(Json(SavedResponse { id }))
}

/// Plain text RDF availability of an order
#[instrument(skip(state), fields(order_id = %id))]
pub async fn rdf_status_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError> {
    let order_id = parse_order_id(&id)?;

    if state.orders.is_rdf_file_available(order_id).await? {
        Ok(RDF_AVAILABLE)
    } else {
        Ok(RDF_NOT_AVAILABLE)
    }
}

/// Stream the finished RDF file of an order
#[instrument(skip(state), fields(order_id = %id))]
pub async fn download_rdf_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let order_id = parse_order_id(&id)?;

    if !state.orders.is_rdf_file_available(order_id).await? {
        return Err(ListenerError::no_rdf_file_available_yet().into());
    }

    let file = state.orders.get_temp_rdf_file(order_id).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(turtle_attachment(body, ORDER_RDF_FILENAME))
}

/// Delete an order and all connected data
#[instrument(skip(state), fields(order_id = %id))]
pub async fn complete_delete_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;

    state.orders.complete_delete(order_id).await?;

    state.metrics.record_order_deleted();
    Ok(StatusCode::NO_CONTENT)
}
