//! Repository ingestion orders
//!
//! An order asks the external pipeline to convert one GitHub repository into
//! RDF. The pipeline moves the status forward and writes the finished Turtle
//! file into the order's large-object row.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::analysis::OrderIdentity;
use super::filter::RepositoryFilter;
use super::id::OrderId;

/// Processing status of an ingestion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    Processing,
    Done,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Done => "DONE",
            OrderStatus::Failed => "FAILED",
        }
    }

    /// Whether the pipeline has finished this order successfully
    pub fn is_done(&self) -> bool {
        matches!(self, OrderStatus::Done)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RECEIVED" => Ok(OrderStatus::Received),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "DONE" => Ok(OrderStatus::Done),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// A repository ingestion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: String,
    pub repository: String,
    pub status: OrderStatus,
    pub number_of_tries: i32,
    pub filter: RepositoryFilter,
}

impl Order {
    pub fn identity(&self) -> OrderIdentity {
        OrderIdentity { owner: self.owner.clone(), repository: self.repository.clone() }
    }
}

/// Values needed to create a new order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub owner: String,
    pub repository: String,
    pub filter: RepositoryFilter,
}

impl NewOrder {
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        filter: RepositoryFilter,
    ) -> Self {
        Self { owner: owner.into(), repository: repository.into(), filter }
    }
}

/// Large-object row of an order holding its generated RDF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLob {
    pub order_id: OrderId,
    pub rdf_file: Option<Bytes>,
}

impl OrderLob {
    /// An empty or missing RDF column both count as "no file yet"
    pub fn rdf_bytes(&self) -> Option<&Bytes> {
        self.rdf_file.as_ref().filter(|bytes| !bytes.is_empty())
    }

    pub fn has_rdf(&self) -> bool {
        self.rdf_bytes().is_some()
    }
}
