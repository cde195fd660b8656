use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::observability::{trace_http_requests, MetricsRecorder};
use crate::services::{OrderService, RatingsService};
use crate::storage::Repositories;

use super::handlers::{
    all_metric_ids_handler, complete_delete_handler, download_metric_ratings_handler,
    download_order_experts_handler, download_order_metric_ratings_handler,
    download_order_ratings_handler, download_rdf_handler, download_single_rating_handler,
    expert_order_ids_handler, health_handler, list_orders_handler, metric_order_ids_handler,
    metric_ratings_handler, metric_stats_handler, order_metric_ids_handler,
    order_metric_ratings_handler, order_rating_list_handler, order_ratings_handler,
    order_stats_handler, queue_handler, queue_with_filter_handler, rdf_status_handler,
};

/// Prefix of every listener endpoint except `/health`
pub const BASE_PATH: &str = "/listener-service/api/v1/github";

#[derive(Clone)]
pub struct ApiState {
    pub orders: OrderService,
    pub ratings: RatingsService,
    pub metrics: MetricsRecorder,
}

impl ApiState {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            orders: OrderService::new(repositories),
            ratings: RatingsService::new(repositories),
            metrics: MetricsRecorder::new(),
        }
    }
}

fn github_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(list_orders_handler))
        .route("/queue", post(queue_handler))
        .route("/queue/filter", post(queue_with_filter_handler))
        .route("/rdf/{id}", get(rdf_status_handler))
        .route("/rdf/download/{id}", get(download_rdf_handler))
        .route("/rdf/completedelete/{id}", delete(complete_delete_handler))
        // order scope
        .route("/ratings/{id}", get(order_ratings_handler))
        .route("/ratings/{id}/stats", get(order_stats_handler))
        .route("/ratings/{id}/metrics", get(order_metric_ids_handler))
        .route("/ratings/{id}/download", get(download_order_ratings_handler))
        .route("/ratings/{id}/download/{metricId}", get(download_order_metric_ratings_handler))
        .route("/ratings/{id}/experts/download", get(download_order_experts_handler))
        .route("/ratings/{id}/{metricId}", get(order_metric_ratings_handler))
        // metric scope
        .route("/ratings/metrics", get(all_metric_ids_handler))
        .route("/ratings/metrics/{metricId}", get(metric_ratings_handler))
        .route("/ratings/metrics/{metricId}/stats", get(metric_stats_handler))
        .route("/ratings/metrics/{metricId}/orders", get(metric_order_ids_handler))
        .route("/ratings/metrics/{metricId}/download", get(download_metric_ratings_handler))
        // global
        .route("/ratings/experts/orders", get(expert_order_ids_handler))
        .route("/rating/{id}", get(order_rating_list_handler))
        .route("/rating/download/{id}", get(download_single_rating_handler))
}

pub fn build_router(repositories: &Repositories, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .nest(BASE_PATH, github_routes())
        .with_state(ApiState::new(repositories))
        .layer(middleware::from_fn(trace_http_requests));

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
