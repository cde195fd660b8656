//! HTTP handlers grouped by resource

pub mod health;
pub mod orders;
pub mod ratings;

pub use health::health_handler;
pub use orders::{
    complete_delete_handler, download_rdf_handler, list_orders_handler, queue_handler,
    queue_with_filter_handler, rdf_status_handler,
};
pub use ratings::{
    all_metric_ids_handler, download_metric_ratings_handler,
    download_order_experts_handler, download_order_metric_ratings_handler,
    download_order_ratings_handler, download_single_rating_handler, expert_order_ids_handler,
    metric_order_ids_handler, metric_ratings_handler, metric_stats_handler,
    order_metric_ids_handler, order_metric_ratings_handler, order_rating_list_handler,
    order_ratings_handler, order_stats_handler,
};
