//! Read-only REST API serving dashboard snapshots.
//!
//! Provides two GET endpoints:
//! - `/dashboard`: a freshly composed snapshot plus UI notifications
//! - `/health`: liveness check

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use chrono::NaiveDateTime;
use tracing::info;

use crate::aggregate::Scenario;
use crate::dashboard::Dashboard;
use crate::settings::DashboardSettings;

pub use types::{DashboardQuery, DashboardResponse, ErrorResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once at startup and wrapped in `Arc`. Each request creates its own
/// noise source, so no locks are needed.
pub struct AppState {
    pub dashboard: Dashboard,
    /// Thresholds and currency for notifications.
    pub settings: DashboardSettings,
    /// Defaults for parameters missing from the query.
    pub forecast_hours: i64,
    pub lookback_hours: i64,
    pub tariff: Option<f64>,
    pub budget: Option<f64>,
    pub scenario: Option<Scenario>,
    /// Fixed reference time; the local clock when unset.
    pub reference: Option<NaiveDateTime>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
