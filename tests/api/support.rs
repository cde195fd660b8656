#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use gitrdf_listener::{
    api::{build_router, BASE_PATH},
    domain::{
        AnalysisId, AnalysisKind, NewAnalysisRecord, NewOrder, OrderId, OrderStatus,
        RepositoryFilter,
    },
    storage::{MemoryStore, OrderRepository, Repositories},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub store: MemoryStore,
    router: Router,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn seed_order(&self, owner: &str, repository: &str) -> OrderId {
        self.store
            .insert_order(NewOrder::new(owner, repository, RepositoryFilter::DEFAULT))
            .await
            .expect("insert order")
    }

    /// Seed an order that finished processing with the given RDF file
    pub async fn seed_done_order(
        &self,
        owner: &str,
        repository: &str,
        rdf: &'static [u8],
    ) -> OrderId {
        let id = self.seed_order(owner, repository).await;
        self.store.store_rdf_file(id, Bytes::from_static(rdf)).await.expect("store rdf");
        self.store.update_status(id, OrderStatus::Done, 1).await.expect("update status");
        id
    }

    /// Seed an analysis record created `hour` hours into 2025-03-01
    pub async fn seed_record(
        &self,
        order_id: OrderId,
        kind: AnalysisKind,
        metric_id: &str,
        version: i32,
        hour: u32,
        rdf: Option<&'static [u8]>,
    ) -> AnalysisId {
        self.store
            .insert_record_at(
                NewAnalysisRecord {
                    order_id,
                    kind,
                    metric_id: metric_id.to_string(),
                    metric_name: format!("{} v{}", metric_id, version),
                    metric_version: version,
                    task_session_id: Some(format!("session-{}", hour % 2)),
                    filter: None,
                    rdf: rdf.map(Bytes::from_static),
                },
                at(hour),
            )
            .await
    }
}

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
}

pub fn setup_test_app() -> TestApp {
    let store = MemoryStore::new();
    let router = build_router(&Repositories::memory(store.clone()), false);
    TestApp { store, router }
}

/// Path below the listener base path
pub fn github(path: &str) -> String {
    format!("{}{}", BASE_PATH, path)
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.router().oneshot(builder.body(body).expect("request")).await.expect("response")
}

pub async fn get(app: &TestApp, path: &str) -> Response {
    send_request(app, Method::GET, path, None).await
}

pub async fn read_bytes(response: Response) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.expect("read body")
}

pub async fn read_text(response: Response) -> String {
    String::from_utf8(read_bytes(response).await.to_vec()).expect("utf8 body")
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = read_bytes(response).await;
    serde_json::from_slice(&bytes).expect("json body")
}
