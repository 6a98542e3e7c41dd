//! Budget notifications and cooldown-gated alert emails.
//!
//! [`evaluate`] is pure: it takes the previous [`NotifierState`] and returns
//! what to show and what to send. [`AlertService`] performs the send and
//! advances the state only when the endpoint accepted the alert.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::BudgetThresholds;
use crate::alerts::{AlertSink, ThresholdAlert, WelcomeAlert};
use crate::error::Result;
use crate::settings::DashboardSettings;

/// Default minimum time between two emails of the same severity.
pub fn default_cooldown() -> Duration {
    Duration::hours(4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    None,
    Warning,
    Critical,
}

/// Severity for a rounded usage percentage; critical wins when both apply.
pub fn severity_for(usage_percent: i64, thresholds: BudgetThresholds) -> AlertSeverity {
    let usage = usage_percent as f64;
    if usage >= thresholds.critical {
        AlertSeverity::Critical
    } else if usage >= thresholds.approaching {
        AlertSeverity::Warning
    } else {
        AlertSeverity::None
    }
}

/// Rounded usage percentage, `None` for a non-positive budget.
pub fn rounded_usage_percent(cost: f64, budget: f64) -> Option<i64> {
    crate::aggregate::usage_percent(cost, budget)
        .filter(|u| u.is_finite())
        .map(|u| u.round() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    AtRisk,
    Approaching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

/// A notification shown in the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: &'static str,
    pub kind: NotificationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub action: &'static str,
}

/// The last email that reached the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentAlert {
    pub severity: AlertSeverity,
    pub at: DateTime<Utc>,
}

/// State carried between evaluations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotifierState {
    pub last_sent: Option<SentAlert>,
}

impl NotifierState {
    /// State after an email of `severity` was accepted at `at`.
    pub fn record(self, severity: AlertSeverity, at: DateTime<Utc>) -> Self {
        Self {
            last_sent: Some(SentAlert { severity, at }),
        }
    }

    /// Whether an email of `severity` may be sent at `now`.
    ///
    /// A different severity than the last one is always allowed; the same
    /// severity only once the cooldown has fully elapsed.
    pub fn allows(&self, severity: AlertSeverity, now: DateTime<Utc>, cooldown: Duration) -> bool {
        if severity == AlertSeverity::None {
            return false;
        }
        match self.last_sent {
            None => true,
            Some(last) => last.severity != severity || now - last.at > cooldown,
        }
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub usage_percent: Option<i64>,
    pub severity: AlertSeverity,
    pub notifications: Vec<Notification>,
    /// Email to send, if any.
    pub dispatch: Option<ThresholdAlert>,
}

fn notifications_for(
    severity: AlertSeverity,
    usage_percent: Option<i64>,
    cost: f64,
    settings: &DashboardSettings,
) -> Vec<Notification> {
    match severity {
        AlertSeverity::Critical => vec![Notification {
            id: "budget-critical",
            kind: NotificationKind::AtRisk,
            priority: Priority::High,
            title: "Budget Exceeded!".to_string(),
            message: format!(
                "Your forecasted spend ({}{}) exceeds your budget limit.",
                settings.currency.symbol(),
                cost.round()
            ),
            action: "Adjust Budget",
        }],
        AlertSeverity::Warning => vec![Notification {
            id: "budget-approaching",
            kind: NotificationKind::Approaching,
            priority: Priority::Medium,
            title: "Approaching Budget Limit".to_string(),
            message: format!(
                "You've reached {}% of your set energy budget for this period.",
                usage_percent.unwrap_or_default()
            ),
            action: "View Details",
        }],
        AlertSeverity::None => Vec::new(),
    }
}

/// Decides notifications and the email side effect for one forecast cost.
///
/// Notifications are always produced. An email is proposed only when email
/// is enabled with an address, the budget is positive, and the cooldown for
/// the severity allows it. A non-positive budget is reported as critical.
pub fn evaluate(
    settings: &DashboardSettings,
    cost: f64,
    budget: f64,
    state: &NotifierState,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Evaluation {
    let usage_percent = rounded_usage_percent(cost, budget);
    let severity = match usage_percent {
        Some(usage) => severity_for(usage, settings.thresholds()),
        None => AlertSeverity::Critical,
    };

    let dispatch = match usage_percent {
        Some(usage) if settings.can_email() && state.allows(severity, now, cooldown) => {
            Some(ThresholdAlert {
                email: settings.email_address.clone(),
                usage_percent: usage,
                budget,
                cost,
            })
        }
        _ => None,
    };

    Evaluation {
        usage_percent,
        severity,
        notifications: notifications_for(severity, usage_percent, cost, settings),
        dispatch,
    }
}

/// Imperative shell around [`evaluate`] that owns the sink and the state.
#[derive(Debug)]
pub struct AlertService<S> {
    sink: S,
    state: NotifierState,
    cooldown: Duration,
}

impl<S: AlertSink> AlertService<S> {
    pub fn new(sink: S) -> Self {
        Self::with_cooldown(sink, default_cooldown())
    }

    pub fn with_cooldown(sink: S, cooldown: Duration) -> Self {
        Self {
            sink,
            state: NotifierState::default(),
            cooldown,
        }
    }

    pub fn state(&self) -> &NotifierState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Evaluates, sends any due email, and returns the evaluation.
    ///
    /// Dispatch failures are logged and leave the state unchanged so the
    /// next evaluation retries.
    pub fn process(
        &mut self,
        settings: &DashboardSettings,
        cost: f64,
        budget: f64,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let evaluation = evaluate(settings, cost, budget, &self.state, now, self.cooldown);
        if let Some(alert) = &evaluation.dispatch {
            match self.sink.send_threshold(alert) {
                Ok(()) => {
                    info!(
                        severity = ?evaluation.severity,
                        usage_percent = alert.usage_percent,
                        email = %alert.email,
                        "threshold alert sent"
                    );
                    self.state = self.state.record(evaluation.severity, now);
                }
                Err(e) => warn!(error = %e, "failed to send threshold alert"),
            }
        }
        evaluation
    }

    /// Persists `next` settings and sends a welcome email when the address
    /// changed to a valid one. Returns the settings now in effect.
    ///
    /// # Errors
    ///
    /// Returns an error only if the settings file cannot be written; a failed
    /// welcome email is logged.
    pub fn save_settings(
        &self,
        previous: &DashboardSettings,
        next: DashboardSettings,
        path: Option<&Path>,
    ) -> Result<DashboardSettings> {
        if let Some(path) = path {
            next.save(path)?;
        }
        if previous.needs_welcome(&next) {
            let alert = WelcomeAlert {
                email: next.email_address.clone(),
            };
            match self.sink.send_welcome(&alert) {
                Ok(()) => info!(email = %alert.email, "welcome email triggered"),
                Err(e) => warn!(error = %e, "failed to trigger welcome email"),
            }
        }
        Ok(next)
    }
}
