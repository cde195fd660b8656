//! Data Transfer Objects (DTOs) for API layer
//!
//! DTOs define the external JSON contract and are kept apart from the domain
//! types so the API can evolve independently.
//!
//! ```text
//! HTTP Request → DTO → Service → Repository → Database
//! HTTP Response ← DTO ← Domain record ← Repository ← Database
//! ```

pub mod order;
pub mod rating;

pub use order::{OrderEntryResponse, QueueRequest, QueueWithFilterRequest, SavedResponse};
pub use rating::{
    GlobalMetricResponse, GlobalMetricStatsResponse, GroupStatsDto, MetricDetailResponse,
    MetricSummary, OrderMetricInfo, OrderRatingsResponse, OrderStatsDto, OrderStatsResponse,
    RatingDetail,
};
