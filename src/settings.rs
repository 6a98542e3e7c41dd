//! User notification settings, persisted as JSON between sessions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::aggregate::BudgetThresholds;
use crate::error::{Result, WattcastError};

/// Display currency for costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "PHP")]
    Php,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Php => "₱",
            Self::Usd => "$",
        }
    }
}

/// Notification settings chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSettings {
    pub email_enabled: bool,
    pub email_address: String,
    /// Percent of budget that raises a warning.
    pub threshold_approaching: f64,
    /// Percent of budget that raises a critical alert.
    pub threshold_critical: f64,
    pub currency: Currency,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        let thresholds = BudgetThresholds::default();
        Self {
            email_enabled: false,
            email_address: String::new(),
            threshold_approaching: thresholds.approaching,
            threshold_critical: thresholds.critical,
            currency: Currency::default(),
        }
    }
}

/// Whether an address is accepted for alert emails (Gmail only).
pub fn is_valid_alert_email(address: &str) -> bool {
    let address = address.trim();
    let lower = address.to_ascii_lowercase();
    lower.len() > "@gmail.com".len() && lower.ends_with("@gmail.com")
}

impl DashboardSettings {
    pub fn thresholds(&self) -> BudgetThresholds {
        BudgetThresholds {
            approaching: self.threshold_approaching,
            critical: self.threshold_critical,
        }
    }

    /// Whether threshold emails may be sent at all.
    pub fn can_email(&self) -> bool {
        self.email_enabled && !self.email_address.trim().is_empty()
    }

    /// Sets the address and enables email only when it is valid.
    pub fn with_email(mut self, address: &str) -> Self {
        self.email_address = address.trim().to_string();
        self.email_enabled = is_valid_alert_email(&self.email_address);
        self
    }

    /// Whether saving `next` over `self` should trigger a welcome email.
    pub fn needs_welcome(&self, next: &DashboardSettings) -> bool {
        next.email_address != self.email_address && is_valid_alert_email(&next.email_address)
    }

    /// Loads settings, returning defaults when the file is missing or invalid.
    pub fn load(path: &Path) -> Self {
        Self::load_or(path, Self::default())
    }

    /// Loads settings over `base`: fields present in the file win, missing
    /// fields keep `base`, and a missing or invalid file yields `base`.
    pub fn load_or(path: &Path, base: Self) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return base;
        };
        let overlay = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                debug!(path = %path.display(), "settings file is not an object, ignored");
                return base;
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "invalid settings file, ignored");
                return base;
            }
        };
        let mut merged = match serde_json::to_value(&base) {
            Ok(Value::Object(map)) => map,
            _ => return base,
        };
        merged.extend(overlay);
        serde_json::from_value(Value::Object(merged)).unwrap_or_else(|e| {
            debug!(path = %path.display(), error = %e, "invalid settings file, ignored");
            base
        })
    }

    /// Persists settings as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `WattcastError::FileWrite` or `WattcastError::Serialize`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| WattcastError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| {
            WattcastError::Serialize {
                what: "settings",
                source,
            }
        })?;
        std::fs::write(path, content).map_err(|source| WattcastError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmail_validation() {
        assert!(is_valid_alert_email("someone@gmail.com"));
        assert!(is_valid_alert_email(" Someone@GMAIL.com "));
        assert!(!is_valid_alert_email("@gmail.com"));
        assert!(!is_valid_alert_email("someone@example.com"));
        assert!(!is_valid_alert_email(""));
    }

    #[test]
    fn with_email_toggles_enabled() {
        let s = DashboardSettings::default().with_email("a@gmail.com");
        assert!(s.email_enabled);
        assert!(s.can_email());
        let s = s.with_email("a@example.com");
        assert!(!s.email_enabled);
    }

    #[test]
    fn welcome_only_for_new_valid_address() {
        let old = DashboardSettings::default().with_email("a@gmail.com");
        assert!(!old.needs_welcome(&old.clone()));
        assert!(old.needs_welcome(&old.clone().with_email("b@gmail.com")));
        assert!(!old.needs_welcome(&old.clone().with_email("b@example.com")));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("nested").join("settings.json");
        let settings = DashboardSettings {
            threshold_approaching: 70.0,
            currency: Currency::Usd,
            ..DashboardSettings::default().with_email("x@gmail.com")
        };
        settings.save(&path).expect("save should succeed");
        assert_eq!(DashboardSettings::load(&path), settings);
    }

    #[test]
    fn load_tolerates_missing_and_partial_files() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let missing = dir.path().join("none.json");
        let defaults = DashboardSettings::default();
        assert_eq!(DashboardSettings::load(&missing), defaults);

        let partial = dir.path().join("partial.json");
        std::fs::write(&partial, r#"{"thresholdCritical": 120, "currency": "USD"}"#)
            .expect("write should succeed");
        let s = DashboardSettings::load(&partial);
        assert_eq!(s.threshold_critical, 120.0);
        assert_eq!(s.threshold_approaching, 80.0);
        assert_eq!(s.currency.symbol(), "$");

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").expect("write should succeed");
        assert_eq!(DashboardSettings::load(&broken), defaults);
    }

    #[test]
    fn load_or_keeps_base_for_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let base = DashboardSettings {
            threshold_approaching: 10.0,
            threshold_critical: 20.0,
            ..DashboardSettings::default()
        };

        let missing = dir.path().join("none.json");
        assert_eq!(DashboardSettings::load_or(&missing, base.clone()), base);

        let partial = dir.path().join("partial.json");
        let content = r#"{"thresholdCritical": 50, "emailAddress": "a@gmail.com"}"#;
        std::fs::write(&partial, content).expect("write should succeed");
        let s = DashboardSettings::load_or(&partial, base.clone());
        assert_eq!(s.threshold_approaching, 10.0);
        assert_eq!(s.threshold_critical, 50.0);
        assert_eq!(s.email_address, "a@gmail.com");

        let wrong_type = dir.path().join("array.json");
        std::fs::write(&wrong_type, "[1, 2]").expect("write should succeed");
        assert_eq!(DashboardSettings::load_or(&wrong_type, base.clone()), base);
    }
}
