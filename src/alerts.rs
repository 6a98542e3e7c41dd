//! Payloads and transport for the external alert endpoint.
//!
//! The endpoint exposes two calls:
//! - `POST /api/alerts/welcome` with `{"email"}`
//! - `POST /api/alerts/threshold` with `{"email", "usage_percent", "budget", "cost"}`

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DispatchError;

pub const WELCOME_PATH: &str = "/api/alerts/welcome";
pub const THRESHOLD_PATH: &str = "/api/alerts/threshold";

/// Sent when a new valid notification address is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelcomeAlert {
    pub email: String,
}

/// Sent when forecast cost crosses a budget threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAlert {
    pub email: String,
    pub usage_percent: i64,
    pub budget: f64,
    pub cost: f64,
}

/// Destination for alert side effects.
pub trait AlertSink {
    fn send_welcome(&self, alert: &WelcomeAlert) -> Result<(), DispatchError>;

    fn send_threshold(&self, alert: &ThresholdAlert) -> Result<(), DispatchError>;
}

/// Sink used when no endpoint is configured; every call fails with
/// `DispatchError::NotConfigured`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSink;

impl AlertSink for DisabledSink {
    fn send_welcome(&self, _alert: &WelcomeAlert) -> Result<(), DispatchError> {
        Err(DispatchError::NotConfigured)
    }

    fn send_threshold(&self, _alert: &ThresholdAlert) -> Result<(), DispatchError> {
        Err(DispatchError::NotConfigured)
    }
}

/// Posts alerts as JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpAlertSink {
    client: Client,
    base_url: String,
}

impl HttpAlertSink {
    /// Creates a sink for `base_url` (scheme and host, no trailing path).
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DispatchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| DispatchError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<(), DispatchError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "posting alert");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|source| DispatchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

impl AlertSink for HttpAlertSink {
    fn send_welcome(&self, alert: &WelcomeAlert) -> Result<(), DispatchError> {
        self.post(WELCOME_PATH, alert)
    }

    fn send_threshold(&self, alert: &ThresholdAlert) -> Result<(), DispatchError> {
        self.post(THRESHOLD_PATH, alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn sink(server: &Server) -> HttpAlertSink {
        HttpAlertSink::new(&server.url(), Duration::from_secs(5)).expect("client should build")
    }

    #[test]
    fn threshold_alert_posts_json_body() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", THRESHOLD_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "email": "a@gmail.com",
                "usage_percent": 85,
                "budget": 300.0,
                "cost": 255.0
            })))
            .with_status(200)
            .with_body(r#"{"status":"success"}"#)
            .create();

        let alert = ThresholdAlert {
            email: "a@gmail.com".to_string(),
            usage_percent: 85,
            budget: 300.0,
            cost: 255.0,
        };
        sink(&server)
            .send_threshold(&alert)
            .expect("dispatch should succeed");
        mock.assert();
    }

    #[test]
    fn welcome_alert_posts_email() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", WELCOME_PATH)
            .match_body(Matcher::Json(json!({ "email": "b@gmail.com" })))
            .with_status(200)
            .create();

        let alert = WelcomeAlert {
            email: "b@gmail.com".to_string(),
        };
        sink(&server)
            .send_welcome(&alert)
            .expect("dispatch should succeed");
        mock.assert();
    }

    #[test]
    fn server_error_is_reported() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", THRESHOLD_PATH)
            .with_status(500)
            .create();
        let alert = ThresholdAlert {
            email: "a@gmail.com".to_string(),
            usage_percent: 120,
            budget: 100.0,
            cost: 120.0,
        };
        let err = sink(&server)
            .send_threshold(&alert)
            .expect_err("500 should fail");
        assert!(matches!(err, DispatchError::Status { status: 500, .. }));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let s = HttpAlertSink::new("http://localhost:8000/", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(s.base_url(), "http://localhost:8000");
    }

    #[test]
    fn disabled_sink_refuses() {
        let err = DisabledSink
            .send_welcome(&WelcomeAlert {
                email: "a@gmail.com".to_string(),
            })
            .expect_err("disabled sink should refuse");
        assert!(matches!(err, DispatchError::NotConfigured));
    }
}
