//! In-process store
//!
//! Implements both repository traits over maps guarded by a single lock.
//! Selected with `DATABASE_URL=memory://` for local development and used by
//! the HTTP integration tests. Deleting an order removes its analysis records,
//! mirroring the `ON DELETE CASCADE` foreign key of the SQL schema.

use crate::domain::{
    AnalysisId, AnalysisKind, AnalysisRecord, NewAnalysisRecord, NewOrder, Order, OrderId,
    OrderIdentity, OrderLob, OrderStatus, RdfPayload,
};
use crate::errors::Result;
use crate::storage::repositories::{
    AnalysisQuery, AnalysisRepository, AnalysisSummary, KindCounts, OrderRepository,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    last_order_id: i64,
    last_analysis_id: i64,
    orders: BTreeMap<OrderId, Order>,
    lobs: BTreeMap<OrderId, OrderLob>,
    analyses: BTreeMap<AnalysisId, AnalysisRecord>,
}

impl MemoryState {
    fn resolve(&self, record: &AnalysisRecord, with_payload: bool) -> AnalysisRecord {
        let mut resolved = record.clone();
        resolved.order = self.orders.get(&record.order_id).map(|order| OrderIdentity {
            owner: order.owner.clone(),
            repository: order.repository.clone(),
        });
        if !with_payload {
            resolved.rdf = record.rdf.without_bytes();
        }
        resolved
    }

    fn matching<'a>(
        &'a self,
        query: &'a AnalysisQuery,
    ) -> impl Iterator<Item = &'a AnalysisRecord> + 'a {
        self.analyses.values().filter(move |record| query.matches(record))
    }
}

/// Shared in-memory implementation of the order and analysis stores
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record with an explicit creation time
    pub async fn insert_record_at(
        &self,
        record: NewAnalysisRecord,
        created_at: DateTime<Utc>,
    ) -> AnalysisId {
        let mut state = self.state.write().await;
        state.last_analysis_id += 1;
        let id = AnalysisId::new(state.last_analysis_id);

        let stored = AnalysisRecord {
            id,
            order_id: record.order_id,
            order: None,
            kind: record.kind,
            metric_id: record.metric_id,
            metric_name: record.metric_name,
            metric_version: record.metric_version,
            task_session_id: record.task_session_id,
            created_at,
            filter: record.filter,
            rdf: RdfPayload::from_column(record.rdf.map(|bytes| bytes.to_vec())),
        };
        state.analyses.insert(id, stored);
        id
    }

    /// Number of stored orders, large-object rows and analysis records
    pub async fn row_counts(&self) -> (usize, usize, usize) {
        let state = self.state.read().await;
        (state.orders.len(), state.lobs.len(), state.analyses.len())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.state.read().await.orders.values().cloned().collect())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut state = self.state.write().await;
        state.last_order_id += 1;
        let id = OrderId::new(state.last_order_id);

        state.orders.insert(
            id,
            Order {
                id,
                owner: order.owner,
                repository: order.repository,
                status: OrderStatus::Received,
                number_of_tries: 0,
                filter: order.filter,
            },
        );
        state.lobs.insert(id, OrderLob { order_id: id, rdf_file: None });

        tracing::info!(order_id = %id, "Created new order");
        Ok(id)
    }

    async fn get_lob(&self, id: OrderId) -> Result<Option<OrderLob>> {
        Ok(self.state.read().await.lobs.get(&id).cloned())
    }

    async fn delete_order_cascade(&self, id: OrderId) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.orders.remove(&id).is_none() {
            return Ok(false);
        }
        state.lobs.remove(&id);
        state.analyses.retain(|_, record| record.order_id != id);
        Ok(true)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        number_of_tries: i32,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                order.number_of_tries = number_of_tries;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn store_rdf_file(&self, id: OrderId, rdf_file: Bytes) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.lobs.get_mut(&id) {
            Some(lob) => {
                lob.rdf_file = Some(rdf_file);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AnalysisRepository for MemoryStore {
    async fn find(&self, query: &AnalysisQuery) -> Result<Vec<AnalysisRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<AnalysisRecord> =
            state.matching(query).map(|record| state.resolve(record, query.with_payload)).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn summarize(&self, query: &AnalysisQuery) -> Result<AnalysisSummary> {
        let state = self.state.read().await;
        let mut summary = AnalysisSummary::default();
        let mut metrics = BTreeSet::new();
        let mut orders = BTreeSet::new();

        for record in state.matching(query) {
            let counts: &mut KindCounts = match record.kind {
                AnalysisKind::Rating => &mut summary.ratings,
                AnalysisKind::Statistic => &mut summary.statistics,
                AnalysisKind::Expert => &mut summary.experts,
            };
            counts.total += 1;
            if record.has_rdf() {
                counts.with_rdf += 1;
            }
            metrics.insert(record.metric_id.as_str());
            orders.insert(record.order_id);
        }

        summary.distinct_metrics = metrics.len() as i64;
        summary.distinct_orders = orders.len() as i64;
        Ok(summary)
    }

    async fn distinct_metric_ids(&self, query: &AnalysisQuery) -> Result<Vec<String>> {
        let state = self.state.read().await;
        let metrics: BTreeSet<&str> =
            state.matching(query).map(|record| record.metric_id.as_str()).collect();
        Ok(metrics.into_iter().map(str::to_string).collect())
    }

    async fn distinct_order_ids(&self, query: &AnalysisQuery) -> Result<Vec<OrderId>> {
        let state = self.state.read().await;
        let orders: BTreeSet<OrderId> =
            state.matching(query).map(|record| record.order_id).collect();
        Ok(orders.into_iter().collect())
    }

    async fn get_record(
        &self,
        id: AnalysisId,
        with_payload: bool,
    ) -> Result<Option<AnalysisRecord>> {
        let state = self.state.read().await;
        Ok(state.analyses.get(&id).map(|record| state.resolve(record, with_payload)))
    }

    async fn insert_record(&self, record: NewAnalysisRecord) -> Result<AnalysisId> {
        Ok(self.insert_record_at(record, Utc::now()).await)
    }
}
