//! In-memory breakdowns over an already fetched list of analysis records
//!
//! Counting across the whole table is done by the store (see
//! `AnalysisRepository::summarize`); these helpers only shape the records a
//! request has already loaded into per-metric, per-order and per-session views.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{AnalysisRecord, OrderId};

/// Count, payload count and time range of a group of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub count: i64,
    pub with_rdf_data: i64,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl GroupStats {
    fn add(&mut self, record: &AnalysisRecord) {
        self.count += 1;
        if record.has_rdf() {
            self.with_rdf_data += 1;
        }
        self.earliest = Some(self.earliest.map_or(record.created_at, |t| t.min(record.created_at)));
        self.latest = Some(self.latest.map_or(record.created_at, |t| t.max(record.created_at)));
    }

    pub fn has_rdf_data(&self) -> bool {
        self.with_rdf_data > 0
    }
}

/// One metric within a list of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricGroup {
    pub metric_id: String,
    /// Name and version of the newest record
    pub metric_name: String,
    pub metric_version: i32,
    pub stats: GroupStats,
}

/// One order within a list of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderGroup {
    pub order_id: OrderId,
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub stats: GroupStats,
}

/// Stats over a whole list
pub fn overall(records: &[AnalysisRecord]) -> GroupStats {
    let mut stats = GroupStats::default();
    records.iter().for_each(|record| stats.add(record));
    stats
}

/// Group records by metric id, sorted by metric id
pub fn by_metric(records: &[AnalysisRecord]) -> Vec<MetricGroup> {
    let mut groups: BTreeMap<&str, MetricGroup> = BTreeMap::new();

    for record in records {
        let group = groups.entry(record.metric_id.as_str()).or_insert_with(|| MetricGroup {
            metric_id: record.metric_id.clone(),
            metric_name: record.metric_name.clone(),
            metric_version: record.metric_version,
            stats: GroupStats::default(),
        });

        if group.stats.latest.map_or(true, |latest| record.created_at > latest) {
            group.metric_name = record.metric_name.clone();
            group.metric_version = record.metric_version;
        }
        group.stats.add(record);
    }

    groups.into_values().collect()
}

/// Group records by owning order, sorted by order id
pub fn by_order(records: &[AnalysisRecord]) -> Vec<OrderGroup> {
    let mut groups: BTreeMap<OrderId, OrderGroup> = BTreeMap::new();

    for record in records {
        let group = groups.entry(record.order_id).or_insert_with(|| OrderGroup {
            order_id: record.order_id,
            owner: record.order.as_ref().map(|order| order.owner.clone()),
            repository: record.order.as_ref().map(|order| order.repository.clone()),
            stats: GroupStats::default(),
        });
        group.stats.add(record);
    }

    groups.into_values().collect()
}

/// Number of records per task session; records without a session are skipped
pub fn task_session_counts(records: &[AnalysisRecord]) -> BTreeMap<String, i64> {
    let mut sessions = BTreeMap::new();
    for session in records.iter().filter_map(|record| record.task_session_id.as_ref()) {
        *sessions.entry(session.clone()).or_insert(0) += 1;
    }
    sessions
}
