use axum::http::{header, Method, StatusCode};
use gitrdf_listener::{
    api::ErrorBody,
    domain::{AnalysisKind, OrderId, OrderStatus},
    storage::OrderRepository,
};
use serde_json::{json, Value};

use crate::support::{get, github, read_bytes, read_json, read_text, send_request, setup_test_app};

#[tokio::test]
async fn health_reports_ok() {
    let app = setup_test_app();
    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn queue_then_list_orders() {
    let app = setup_test_app();

    let response = send_request(
        &app,
        Method::POST,
        &github("/queue"),
        Some(json!({"owner": "dotnet", "repository": "core"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved: Value = read_json(response).await;
    let id = saved["id"].as_i64().unwrap();

    app.seed_record(OrderId::new(id), AnalysisKind::Rating, "m1", 1, 1, None).await;
    app.seed_record(OrderId::new(id), AnalysisKind::Statistic, "m1", 1, 2, None).await;

    let listed: Vec<Value> = read_json(get(&app, &github("")).await).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed[0],
        json!({
            "id": id,
            "status": "RECEIVED",
            "numberOfTries": 0,
            "owner": "dotnet",
            "repository": "core",
            "ratings": 1,
            "statistics": 1
        })
    );
}

#[tokio::test]
async fn queue_rejects_blank_fields() {
    let app = setup_test_app();

    let blank_owner = json!({"owner": " ", "repository": "core"});
    let response = send_request(&app, Method::POST, &github("/queue"), Some(blank_owner)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.status, "Bad Request");
    assert_eq!(body.reason, "No owner was specified");

    let no_repository = json!({"owner": "dotnet"});
    let response = send_request(&app, Method::POST, &github("/queue"), Some(no_repository)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.reason, "No repository was specified");

    assert_eq!(app.store.row_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn queue_with_filter_requires_an_enabled_option() {
    let app = setup_test_app();
    let path = github("/queue/filter");

    let missing_filter = json!({"owner": "dotnet", "repository": "core"});
    let response = send_request(&app, Method::POST, &path, Some(missing_filter)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.reason, "All repository filter options are disabled");

    let all_disabled = json!({
        "owner": "dotnet",
        "repository": "core",
        "repositoryFilter": {"commitFilter": {"enableCommitHash": false}}
    });
    let response = send_request(&app, Method::POST, &path, Some(all_disabled)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let one_enabled = json!({
        "owner": "dotnet",
        "repository": "core",
        "repositoryFilter": {"issueFilter": {"enableIssueTitle": true}}
    });
    let response = send_request(&app, Method::POST, &path, Some(one_enabled)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved: Value = read_json(response).await;

    let id = OrderId::new(saved["id"].as_i64().unwrap());
    let order = app.store.get_order(id).await.unwrap().unwrap();
    assert_eq!(order.filter.issue_filter.enabled_count(), 1);
    assert!(!order.filter.commit_filter.any_enabled());
}

#[tokio::test]
async fn queue_with_filter_checks_owner_and_repository_before_filter() {
    let app = setup_test_app();
    let path = github("/queue/filter");
    let filter = json!({"issueFilter": {"enableIssueTitle": true}});

    let blank_owner = json!({"owner": "", "repository": "core", "repositoryFilter": filter});
    let response = send_request(&app, Method::POST, &path, Some(blank_owner)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.reason, "No owner was specified");

    // owner and repository are reported even when the filter is also invalid
    let nothing = json!({"repository": "core"});
    let response = send_request(&app, Method::POST, &path, Some(nothing)).await;
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.reason, "No owner was specified");

    let no_repository = json!({"owner": "dotnet", "repositoryFilter": filter});
    let response = send_request(&app, Method::POST, &path, Some(no_repository)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.reason, "No repository was specified");

    assert_eq!(app.store.row_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn malformed_body_uses_error_format() {
    let app = setup_test_app();
    let not_an_object = json!(["not", "an", "object"]);
    let response = send_request(&app, Method::POST, &github("/queue"), Some(not_an_object)).await;

    assert!(response.status().is_client_error());
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.status, "Bad Request");
}

#[tokio::test]
async fn invalid_id_is_bad_request() {
    let app = setup_test_app();

    for path in [
        "/rdf/blub",
        "/rdf/download/blub",
        "/ratings/blub",
        "/ratings/0/stats",
        "/rating/download/-1",
    ] {
        let response = get(&app, &github(path)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", path);
    }

    let body: ErrorBody = read_json(get(&app, &github("/rdf/blub")).await).await;
    assert_eq!(
        body,
        ErrorBody {
            status: "Bad Request".to_string(),
            reason: "Invalid id 'blub' was given".to_string(),
            solution: "Provide a valid id. Example id: 55".to_string(),
        }
    );
}

#[tokio::test]
async fn rdf_status_follows_processing_state() {
    let app = setup_test_app();

    let response = get(&app, &github("/rdf/77")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.status, "Not found");
    assert_eq!(body.reason, "No github to rdf entry found for id '77'");

    let id = app.seed_order("dotnet", "core").await;
    assert_eq!(read_text(get(&app, &github(&format!("/rdf/{}", id))).await).await, "not available");

    // file present but the pipeline has not marked the order DONE yet
    app.store.store_rdf_file(id, bytes::Bytes::from_static(b"<s> <p> <o> .")).await.unwrap();
    app.store.update_status(id, OrderStatus::Processing, 1).await.unwrap();
    assert_eq!(read_text(get(&app, &github(&format!("/rdf/{}", id))).await).await, "not available");

    app.store.update_status(id, OrderStatus::Done, 1).await.unwrap();
    assert_eq!(read_text(get(&app, &github(&format!("/rdf/{}", id))).await).await, "available");
}

#[tokio::test]
async fn download_rdf_streams_file() {
    let app = setup_test_app();
    let pending = app.seed_order("rust-lang", "rust").await;
    let done = app.seed_done_order("dotnet", "core", b"@prefix ex: <http://example.org/> .").await;

    let response = get(&app, &github(&format!("/rdf/download/{}", pending))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert!(body.solution.contains("DONE"));

    assert_eq!(get(&app, &github("/rdf/download/999")).await.status(), StatusCode::NOT_FOUND);

    let response = get(&app, &github(&format!("/rdf/download/{}", done))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "attachment; filename=\"rdf.ttl\"");
    assert_eq!(read_bytes(response).await.as_ref(), b"@prefix ex: <http://example.org/> .");
}

#[tokio::test]
async fn complete_delete_of_missing_order_changes_nothing() {
    let app = setup_test_app();
    let id = app.seed_done_order("dotnet", "core", b"<s> <p> <o> .").await;
    app.seed_record(id, AnalysisKind::Rating, "m1", 1, 1, None).await;

    let response =
        send_request(&app, Method::DELETE, &github("/rdf/completedelete/404"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.row_counts().await, (1, 1, 1));
}

#[tokio::test]
async fn complete_delete_removes_order_and_lob() {
    let app = setup_test_app();
    let kept = app.seed_order("rust-lang", "rust").await;
    let id = app.seed_done_order("dotnet", "core", b"<s> <p> <o> .").await;
    let delete_path = github(&format!("/rdf/completedelete/{}", id));

    let response = send_request(&app, Method::DELETE, &delete_path, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.row_counts().await, (1, 1, 0));

    assert_eq!(get(&app, &github(&format!("/rdf/{}", id))).await.status(), StatusCode::NOT_FOUND);
    let ratings = get(&app, &github(&format!("/ratings/{}", id))).await;
    assert_eq!(ratings.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, &github(&format!("/rdf/{}", kept))).await.status(), StatusCode::OK);

    let response = send_request(&app, Method::DELETE, &delete_path, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
