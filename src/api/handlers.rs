//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Local, Utc};
use serde_json::json;

use super::AppState;
use super::types::{DashboardQuery, DashboardResponse, ErrorResponse};
use crate::dashboard::{ApplianceFilter, ForecastRequest, MAX_DAY_OFFSET, MAX_WINDOW_HOURS};
use crate::noise::{entropy, seeded};
use crate::notify::{NotifierState, default_cooldown, evaluate};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// `GET /health` → 200 + `{"status":"ok"}`
pub async fn get_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Composes a snapshot for the query parameters.
///
/// `GET /dashboard?forecast_hours=4&tariff=12` → 200 + `DashboardResponse`
/// `GET /dashboard?forecast_hours=0` → 400 + `ErrorResponse`
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    let request = build_request(&state, &query)?;
    Ok(Json(respond(&state, &request, query.seed)))
}

fn build_request(state: &AppState, query: &DashboardQuery) -> Result<ForecastRequest, ApiError> {
    let forecast_hours = query.forecast_hours.unwrap_or(state.forecast_hours);
    let lookback_hours = query.lookback_hours.unwrap_or(state.lookback_hours);
    for (name, hours) in [
        ("forecast_hours", forecast_hours),
        ("lookback_hours", lookback_hours),
    ] {
        if !(1..=MAX_WINDOW_HOURS).contains(&hours) {
            return Err(bad_request(format!(
                "`{name}` ({hours}) must be within 1..={MAX_WINDOW_HOURS}"
            )));
        }
    }
    for (name, value) in [("tariff", query.tariff), ("budget", query.budget)] {
        if let Some(v) = value
            && !(v.is_finite() && v > 0.0)
        {
            return Err(bad_request(format!("`{name}` ({v}) must be > 0")));
        }
    }

    let day_offset = query.day_offset.unwrap_or(0);
    if !(-MAX_DAY_OFFSET..=MAX_DAY_OFFSET).contains(&day_offset) {
        return Err(bad_request(format!(
            "`day_offset` ({day_offset}) must be within -{MAX_DAY_OFFSET}..={MAX_DAY_OFFSET}"
        )));
    }

    let filter = match query.appliance.as_deref() {
        None => ApplianceFilter::All,
        Some(name) => ApplianceFilter::parse(name, state.dashboard.appliances())
            .ok_or_else(|| bad_request(format!("unknown appliance \"{name}\"")))?,
    };

    let request = ForecastRequest {
        forecast_hours,
        lookback_hours,
        reference: state
            .reference
            .unwrap_or_else(|| Local::now().naive_local()),
        tariff: query.tariff.or(state.tariff),
        budget: query.budget.or(state.budget),
        filter,
        scenario: state.scenario,
    };
    Ok(request.shifted_days(day_offset))
}

fn respond(state: &AppState, request: &ForecastRequest, seed: Option<u64>) -> DashboardResponse {
    let thresholds = state.settings.thresholds();
    let dashboard = &state.dashboard;
    let snapshot = match seed {
        Some(seed) => dashboard.snapshot(request, thresholds, &mut seeded(seed)),
        None => dashboard.snapshot(request, thresholds, &mut entropy()),
    };
    let evaluation = evaluate(
        &state.settings,
        snapshot.summary.next_cost,
        snapshot.budget,
        &NotifierState::default(),
        Utc::now(),
        default_cooldown(),
    );
    DashboardResponse {
        usage_percent: evaluation.usage_percent,
        severity: evaluation.severity,
        notifications: evaluation.notifications,
        snapshot,
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::appliance::ApplianceSet;
    use crate::dashboard::Dashboard;
    use crate::dataset::{PeriodSample, SampleDataset};
    use crate::settings::DashboardSettings;

    fn make_test_state() -> Arc<AppState> {
        let mut ds = SampleDataset::default();
        let mut period = PeriodSample::default();
        period.forecast.insert("ac".to_string(), vec![10.0; 4]);
        ds.sample_data.insert("4hours".to_string(), period);
        Arc::new(AppState {
            dashboard: Dashboard::new(Some(ds), ApplianceSet::standard()),
            settings: DashboardSettings::default(),
            forecast_hours: 1,
            lookback_hours: 1,
            tariff: Some(10.0),
            budget: Some(300.0),
            scenario: None,
            reference: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (status, json) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn dashboard_uses_defaults() {
        let (status, json) = get_json("/dashboard?seed=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["period"], "1hour");
        assert_eq!(json["period_text"], "Next 1 Hour");
        assert_eq!(json["labels"]["prev_labels"][0], "12/31/24 23:00");
        assert_eq!(json["labels"]["next_labels"][0], "01/01/25 00:00");
    }

    #[tokio::test]
    async fn dashboard_reports_critical_notification() {
        let (status, json) = get_json("/dashboard?forecast_hours=4&seed=2").await;
        assert_eq!(status, StatusCode::OK);
        // ac alone costs 4 * 10 * 10 = 400 against a budget of 300
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["summary"]["budget_status"], "AtRisk");
        assert_eq!(json["notifications"][0]["title"], "Budget Exceeded!");
        assert_eq!(json["forecast_series"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn same_seed_gives_same_snapshot() {
        let (_, a) = get_json("/dashboard?forecast_hours=8&seed=9").await;
        let (_, b) = get_json("/dashboard?forecast_hours=8&seed=9").await;
        assert_eq!(a["forecast_series"], b["forecast_series"]);
    }

    #[tokio::test]
    async fn appliance_filter_selects_series() {
        let (status, json) =
            get_json("/dashboard?forecast_hours=4&appliance=ac&seed=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["next_forecast"],
            serde_json::json!([10.0, 10.0, 10.0, 10.0])
        );
    }

    #[tokio::test]
    async fn day_offset_shifts_labels() {
        let (status, json) = get_json("/dashboard?day_offset=-1&seed=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["labels"]["next_labels"][0], "12/31/24 00:00");
        let (_, json) = get_json("/dashboard?day_offset=2&seed=1").await;
        assert_eq!(json["labels"]["next_labels"][0], "01/03/25 00:00");
    }

    #[tokio::test]
    async fn breakdown_filter_returns_lines() {
        let (status, json) = get_json("/dashboard?appliance=breakdown&seed=1").await;
        assert_eq!(status, StatusCode::OK);
        let lines = json["breakdown"].as_array().map(Vec::len);
        assert_eq!(lines, Some(4));
        assert_eq!(json["breakdown"][3]["name"], "Others");
    }

    #[tokio::test]
    async fn invalid_parameters_return_400() {
        for uri in [
            "/dashboard?forecast_hours=0",
            "/dashboard?lookback_hours=500",
            "/dashboard?budget=-5",
            "/dashboard?appliance=toaster",
            "/dashboard?forecast_hours=abc",
            "/dashboard?day_offset=100000000000000",
        ] {
            let (status, json) = get_json(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(json.get("error").is_some(), "{uri}");
        }
    }
}
