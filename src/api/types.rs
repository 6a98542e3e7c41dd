//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardSnapshot;
use crate::notify::{AlertSeverity, Notification};

/// Query parameters for `GET /dashboard`. Missing values use server defaults.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub forecast_hours: Option<i64>,
    pub lookback_hours: Option<i64>,
    pub tariff: Option<f64>,
    pub budget: Option<f64>,
    /// `all`, an appliance key or a display name.
    pub appliance: Option<String>,
    /// Days to shift the reference by; negative values look back.
    pub day_offset: Option<i64>,
    /// Makes synthesized values reproducible.
    pub seed: Option<u64>,
}

/// Snapshot plus the notifications a UI would show for it.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
    pub usage_percent: Option<i64>,
    pub severity: AlertSeverity,
    pub notifications: Vec<Notification>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
