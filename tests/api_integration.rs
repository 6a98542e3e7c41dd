//! Router-level tests for the REST API against the bundled dataset.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;
use wattcast::api::{AppState, router};
use wattcast::appliance::ApplianceSet;
use wattcast::dashboard::Dashboard;
use wattcast::dataset::SampleDataset;
use wattcast::settings::DashboardSettings;

fn state() -> Arc<AppState> {
    let dataset = SampleDataset::load_or_degrade(std::path::Path::new(common::SAMPLE_DATASET));
    Arc::new(AppState {
        dashboard: Dashboard::new(dataset, ApplianceSet::with_washing_machine()),
        settings: DashboardSettings::default(),
        forecast_hours: 4,
        lookback_hours: 4,
        tariff: None,
        budget: None,
        scenario: None,
        reference: Some(common::reference()),
    })
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let resp = router(state())
        .oneshot(req)
        .await
        .expect("router should respond");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = serde_json::from_slice(&body).expect("body should be JSON");
    (status, json)
}

#[tokio::test]
async fn dashboard_serves_dataset_backed_snapshot() {
    let (status, json) = get("/dashboard?seed=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["period"], "4hours");
    assert_eq!(json["tariff"], 13.47);
    assert_eq!(json["budget"], 300.0);
    assert_eq!(json["labels"]["next_points"], 4);
    let appliances = json["summary"]["appliances"].as_array().map(Vec::len);
    assert_eq!(appliances, Some(4));
}

#[tokio::test]
async fn short_sample_period_is_padded() {
    let (status, json) = get("/dashboard?forecast_hours=24&lookback_hours=24&seed=5").await;
    assert_eq!(status, StatusCode::OK);
    let ac = json["forward"]["appliances"][0]["values"]
        .as_array()
        .map(Vec::len);
    assert_eq!(ac, Some(24));
}

#[tokio::test]
async fn bad_query_is_rejected() {
    let (status, json) = get("/dashboard?tariff=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some_and(|e| e.contains("tariff")));
}
