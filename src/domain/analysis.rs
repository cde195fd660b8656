//! Analysis records
//!
//! Ratings, statistics and expert assessments produced by the external
//! analysis pipeline for an order. Each record is tied to one metric and may
//! carry a Turtle payload.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::filter::RatingFilter;
use super::id::{AnalysisId, OrderId};

/// Kind of an analysis record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisKind {
    Rating,
    Statistic,
    Expert,
}

impl AnalysisKind {
    /// Value stored in the `analysis_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Rating => "RATING",
            AnalysisKind::Statistic => "STATISTIC",
            AnalysisKind::Expert => "EXPERT",
        }
    }

    /// Lowercase label used in export file names
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::Rating => "rating",
            AnalysisKind::Statistic => "statistic",
            AnalysisKind::Expert => "expert",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RATING" => Ok(AnalysisKind::Rating),
            "STATISTIC" => Ok(AnalysisKind::Statistic),
            "EXPERT" => Ok(AnalysisKind::Expert),
            other => Err(format!("Unknown analysis type: {}", other)),
        }
    }
}

/// RDF payload of an analysis record.
///
/// Listing queries only report whether a payload exists; export queries load
/// the bytes. NULL and zero-length columns are both `Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RdfPayload {
    #[default]
    Absent,
    Stored,
    Loaded(Bytes),
}

impl RdfPayload {
    /// Build from a loaded column value
    pub fn from_column(value: Option<Vec<u8>>) -> Self {
        match value {
            Some(bytes) if !bytes.is_empty() => RdfPayload::Loaded(Bytes::from(bytes)),
            _ => RdfPayload::Absent,
        }
    }

    /// Build from a presence flag when the bytes were not selected
    pub fn from_presence(present: bool) -> Self {
        if present {
            RdfPayload::Stored
        } else {
            RdfPayload::Absent
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, RdfPayload::Absent)
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            RdfPayload::Loaded(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Drop loaded bytes, keeping only the presence information
    pub fn without_bytes(&self) -> Self {
        RdfPayload::from_presence(self.is_present())
    }
}

/// Owner and repository of the order a record belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderIdentity {
    pub owner: String,
    pub repository: String,
}

/// A rating, statistic or expert record
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub id: AnalysisId,
    pub order_id: OrderId,
    /// Resolved parent order; `None` when the join found no order row
    pub order: Option<OrderIdentity>,
    pub kind: AnalysisKind,
    pub metric_id: String,
    pub metric_name: String,
    pub metric_version: i32,
    pub task_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub filter: Option<RatingFilter>,
    pub rdf: RdfPayload,
}

impl AnalysisRecord {
    pub fn has_rdf(&self) -> bool {
        self.rdf.is_present()
    }
}

/// Values needed to store a new analysis record
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysisRecord {
    pub order_id: OrderId,
    pub kind: AnalysisKind,
    pub metric_id: String,
    pub metric_name: String,
    pub metric_version: i32,
    pub task_session_id: Option<String>,
    pub filter: Option<RatingFilter>,
    pub rdf: Option<Bytes>,
}
