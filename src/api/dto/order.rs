//! Order DTOs for API request/response handling

use serde::{Deserialize, Serialize};

use crate::domain::{OrderId, OrderStatus, RepositoryFilter};
use crate::services::OrderOverview;

/// Request body of `POST /queue`
///
/// Both fields are optional on the wire so that a missing value is reported
/// with the same error as a blank one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRequest {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
}

/// Request body of `POST /queue/filter`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueWithFilterRequest {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    /// Left out toggles are disabled; a missing filter counts as all disabled
    #[serde(default)]
    pub repository_filter: Option<RepositoryFilter>,
}

/// Response of both enqueue endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResponse {
    pub id: OrderId,
}

/// One entry of the order listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntryResponse {
    pub id: OrderId,
    pub status: OrderStatus,
    pub number_of_tries: i32,
    pub owner: String,
    pub repository: String,
    /// `null` when the count could not be computed
    pub ratings: Option<i64>,
    pub statistics: Option<i64>,
}

impl From<OrderOverview> for OrderEntryResponse {
    fn from(overview: OrderOverview) -> Self {
        let order = overview.order;
        Self {
            id: order.id,
            status: order.status,
            number_of_tries: order.number_of_tries,
            owner: order.owner,
            repository: order.repository,
            ratings: overview.ratings,
            statistics: overview.statistics,
        }
    }
}
