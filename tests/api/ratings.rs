use axum::http::{header, StatusCode};
use gitrdf_listener::{api::ErrorBody, domain::AnalysisKind};
use serde_json::Value;

use crate::support::{get, github, read_json, read_text, setup_test_app};

const ORDER_SCOPED: [&str; 7] = [
    "",
    "/stats",
    "/metrics",
    "/download",
    "/download/m1",
    "/experts/download",
    "/m1",
];

#[tokio::test]
async fn order_scoped_routes_require_an_existing_order() {
    let app = setup_test_app();

    for suffix in ORDER_SCOPED {
        let response = get(&app, &github(&format!("/ratings/42{}", suffix))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "/ratings/42{}", suffix);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.reason, "No github to rdf entry found for id '42'");
    }

    assert_eq!(get(&app, &github("/rating/42")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_of_order_without_records_are_zero() {
    let app = setup_test_app();
    let id = app.seed_order("dotnet", "core").await;

    let response = get(&app, &github(&format!("/ratings/{}/stats", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats: Value = read_json(response).await;

    for field in [
        "totalRatings",
        "totalStatistics",
        "totalExperts",
        "uniqueMetrics",
        "ratingsWithRdf",
        "statisticsWithRdf",
        "expertsWithRdf",
    ] {
        assert_eq!(stats[field], 0, "{}", field);
    }
    assert_eq!(stats["owner"], "dotnet");
    assert!(stats["earliestRating"].is_null());
    assert_eq!(stats["metricBreakdown"], serde_json::json!({}));
}

#[tokio::test]
async fn stats_count_every_kind() {
    let app = setup_test_app();
    let id = app.seed_order("dotnet", "core").await;
    app.seed_record(id, AnalysisKind::Rating, "m1", 1, 1, Some(b"<a> <b> <c> .")).await;
    app.seed_record(id, AnalysisKind::Rating, "m2", 1, 2, None).await;
    app.seed_record(id, AnalysisKind::Statistic, "m1", 1, 3, Some(b"<d> <e> <f> .")).await;
    app.seed_record(id, AnalysisKind::Expert, "m3", 1, 4, None).await;

    let stats: Value = read_json(get(&app, &github(&format!("/ratings/{}/stats", id))).await).await;
    assert_eq!(stats["totalRatings"], 2);
    assert_eq!(stats["totalStatistics"], 1);
    assert_eq!(stats["totalExperts"], 1);
    assert_eq!(stats["uniqueMetrics"], 3);
    assert_eq!(stats["ratingsWithRdf"], 1);
    assert_eq!(stats["statisticsWithRdf"], 1);
    assert_eq!(stats["expertsWithRdf"], 0);
    assert_eq!(stats["metricBreakdown"]["m1"]["ratingCount"], 1);
    assert_eq!(stats["metricBreakdown"]["m1"]["withRdfData"], 1);

    let metric_ids: Vec<String> =
        read_json(get(&app, &github(&format!("/ratings/{}/metrics", id))).await).await;
    assert_eq!(metric_ids, vec!["m1", "m2", "m3"]);
}

#[tokio::test]
async fn empty_order_listing_differs_from_empty_metric_lookup() {
    let app = setup_test_app();
    let id = app.seed_order("dotnet", "core").await;

    let response = get(&app, &github(&format!("/ratings/{}", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let ratings: Value = read_json(response).await;
    assert_eq!(ratings["totalRatings"], 0);
    assert_eq!(ratings["metrics"], serde_json::json!([]));

    let response = get(&app, &github(&format!("/ratings/{}/m1", id))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.reason, format!("No ratings found for order '{}' and metric 'm1'", id));

    let list: Vec<Value> = read_json(get(&app, &github(&format!("/rating/{}", id))).await).await;
    assert!(list.is_empty());
}

#[tokio::test]
async fn metric_detail_reports_newest_record() {
    let app = setup_test_app();
    let id = app.seed_order("dotnet", "core").await;
    app.seed_record(id, AnalysisKind::Rating, "m1", 1, 1, None).await;
    app.seed_record(id, AnalysisKind::Rating, "m1", 3, 5, None).await;
    app.seed_record(id, AnalysisKind::Rating, "m1", 2, 3, None).await;
    app.seed_record(id, AnalysisKind::Statistic, "m1", 9, 9, None).await;

    let detail: Value = read_json(get(&app, &github(&format!("/ratings/{}/m1", id))).await).await;
    assert_eq!(detail["metricName"], "m1 v3");
    assert_eq!(detail["metricVersion"], 3);
    assert_eq!(detail["ratingCount"], 3);
    assert_eq!(detail["ratings"][0]["metricVersion"], 3);
    assert_eq!(detail["ratings"][2]["metricVersion"], 1);

    let list: Vec<Value> = read_json(get(&app, &github(&format!("/rating/{}", id))).await).await;
    assert_eq!(list.len(), 3);
}

#[tokio::test]
async fn downloads_without_payloads_are_no_content() {
    let app = setup_test_app();
    let id = app.seed_order("dotnet", "core").await;
    app.seed_record(id, AnalysisKind::Rating, "m1", 1, 1, None).await;
    app.seed_record(id, AnalysisKind::Expert, "m1", 1, 2, None).await;

    for path in [
        format!("/ratings/{}/download", id),
        format!("/ratings/{}/download/m1", id),
        format!("/ratings/{}/experts/download", id),
        "/ratings/metrics/m1/download".to_string(),
        "/ratings/metrics/unknown/download".to_string(),
    ] {
        let response = get(&app, &github(&path)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{}", path);
    }
}

#[tokio::test]
async fn order_download_bundles_every_payload() {
    let app = setup_test_app();
    let id = app.seed_order("dotnet", "core").await;
    app.seed_record(id, AnalysisKind::Rating, "m1", 1, 1, Some(b"<a> <b> <c> .")).await;
    app.seed_record(id, AnalysisKind::Rating, "m2", 1, 2, Some(b"<d> <e> <f> .")).await;
    app.seed_record(id, AnalysisKind::Rating, "m3", 1, 3, None).await;
    app.seed_record(id, AnalysisKind::Statistic, "m1", 1, 4, Some(b"<g> <h> <i> .")).await;

    let response = get(&app, &github(&format!("/ratings/{}/download", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/turtle");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
        format!("attachment; filename=\"order_order_{}_dotnet_core.ttl\"", id)
    );

    let body = read_text(response).await;
    assert_eq!(body.matches("##filename: ").count(), 2);
    let rating_header = format!("##filename: order_{}_dotnet_core_m1_rating.ttl\n", id);
    assert!(body.contains(&format!("{}<a> <b> <c> .", rating_header)));
    assert!(body.contains("<d> <e> <f> ."));
    assert!(!body.contains("<g> <h> <i> ."));

    let response = get(&app, &github(&format!("/ratings/{}/download/m2", id))).await;
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
        format!("attachment; filename=\"order_metric_order_{}_dotnet_core_metric_m2.ttl\"", id)
    );
    let body = read_text(response).await;
    assert_eq!(body.matches("##filename: ").count(), 1);
    assert!(body.ends_with("<d> <e> <f> ."));
}

#[tokio::test]
async fn expert_routes() {
    let app = setup_test_app();
    let first = app.seed_order("dotnet", "core").await;
    let second = app.seed_order("rust-lang", "rust").await;
    app.seed_record(first, AnalysisKind::Rating, "m1", 1, 1, Some(b"<a> <b> <c> .")).await;
    app.seed_record(second, AnalysisKind::Expert, "m1", 1, 2, Some(b"<x> <y> <z> .")).await;

    let orders: Vec<i64> = read_json(get(&app, &github("/ratings/experts/orders")).await).await;
    assert_eq!(orders, vec![second.as_i64()]);

    let response = get(&app, &github(&format!("/ratings/{}/experts/download", second))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
        format!("attachment; filename=\"experts_order_{}_rust-lang_rust.ttl\"", second)
    );
    let body = read_text(response).await;
    let expert_header = format!("##filename: order_{}_rust-lang_rust_m1_expert.ttl\n", second);
    assert!(body.starts_with(&expert_header));

    let response = get(&app, &github(&format!("/ratings/{}/experts/download", first))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn metric_scope_across_orders() {
    let app = setup_test_app();
    let first = app.seed_order("dotnet", "core").await;
    let second = app.seed_order("rust-lang", "rust").await;
    app.seed_record(first, AnalysisKind::Rating, "m1", 1, 1, Some(b"<a> <b> <c> .")).await;
    app.seed_record(second, AnalysisKind::Rating, "m1", 2, 2, None).await;
    app.seed_record(second, AnalysisKind::Statistic, "m1", 2, 3, Some(b"<s> <t> <u> .")).await;
    app.seed_record(second, AnalysisKind::Rating, "m2", 1, 4, None).await;

    let metric_ids: Vec<String> = read_json(get(&app, &github("/ratings/metrics")).await).await;
    assert_eq!(metric_ids, vec!["m1", "m2"]);

    let metric: Value = read_json(get(&app, &github("/ratings/metrics/m1")).await).await;
    assert_eq!(metric["metricName"], "m1 v2");
    assert_eq!(metric["totalRatings"], 2);
    assert_eq!(metric["uniqueOrders"], 2);

    let stats: Value = read_json(get(&app, &github("/ratings/metrics/m1/stats")).await).await;
    assert_eq!(stats["totalRatings"], 2);
    assert_eq!(stats["totalStatistics"], 1);
    assert_eq!(stats["uniqueOrders"], 2);
    assert_eq!(stats["ratingsWithRdf"], 1);
    assert_eq!(stats["statisticsWithRdf"], 1);
    assert_eq!(stats["orderBreakdown"][first.to_string()]["owner"], "dotnet");
    assert_eq!(stats["orderBreakdown"][second.to_string()]["ratingCount"], 1);

    let orders: Vec<i64> = read_json(get(&app, &github("/ratings/metrics/m1/orders")).await).await;
    assert_eq!(orders, vec![first.as_i64(), second.as_i64()]);

    let response = get(&app, &github("/ratings/metrics/m1/download")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"metric_metric_m1.ttl\""
    );
    let body = read_text(response).await;
    assert_eq!(body.matches("##filename: ").count(), 1);
    assert!(body.contains("<a> <b> <c> ."));
}

#[tokio::test]
async fn unknown_metric_is_not_found() {
    let app = setup_test_app();

    for path in ["/ratings/metrics/nope", "/ratings/metrics/nope/stats"] {
        let response = get(&app, &github(path)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.reason, "No ratings found for metric 'nope'");
    }

    let orders: Vec<i64> =
        read_json(get(&app, &github("/ratings/metrics/nope/orders")).await).await;
    assert!(orders.is_empty());
}

#[tokio::test]
async fn single_record_download() {
    let app = setup_test_app();
    let id = app.seed_order("dotnet", "core").await;
    let with_payload =
        app.seed_record(id, AnalysisKind::Rating, "m1", 1, 1, Some(b"<a> <b> <c> .")).await;
    let without_payload = app.seed_record(id, AnalysisKind::Rating, "m1", 1, 2, None).await;

    let response = get(&app, &github(&format!("/rating/download/{}", with_payload))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"metric-rating.ttl\""
    );
    assert_eq!(read_text(response).await, "<a> <b> <c> .");

    let response = get(&app, &github(&format!("/rating/download/{}", without_payload))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, &github("/rating/download/999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.reason, "No analysis record found for id '999'");
}
