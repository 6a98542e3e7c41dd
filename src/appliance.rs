//! Appliance descriptors and the ordered appliance set.

use serde::Serialize;

/// Static description of one monitored appliance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplianceDescriptor {
    /// Short stable key (`fan`, `ac`, `ref`, `wm`).
    pub key: &'static str,
    /// Name shown to users and used to look up `applianceRanges`.
    pub display_name: &'static str,
    /// Key of this appliance's forward series in `sampleData[period].forecast`.
    pub sample_key: &'static str,
    /// Fallback synthesis range `[min, max)` in kWh per hour.
    pub default_range: (f64, f64),
    /// Share of the household lookback total attributed to this appliance.
    pub lookback_share: f64,
}

impl ApplianceDescriptor {
    pub const ELECTRIC_FAN: ApplianceDescriptor = ApplianceDescriptor {
        key: "fan",
        display_name: "Electric Fan",
        sample_key: "electricFan",
        default_range: (0.05, 0.15),
        lookback_share: 0.10,
    };

    pub const AIR_CONDITIONER: ApplianceDescriptor = ApplianceDescriptor {
        key: "ac",
        display_name: "Air Conditioner",
        sample_key: "ac",
        default_range: (2.2, 2.8),
        lookback_share: 0.55,
    };

    pub const REFRIGERATOR: ApplianceDescriptor = ApplianceDescriptor {
        key: "ref",
        display_name: "Refrigerator",
        sample_key: "refrigerator",
        default_range: (1.1, 1.4),
        lookback_share: 0.25,
    };

    pub const WASHING_MACHINE: ApplianceDescriptor = ApplianceDescriptor {
        key: "wm",
        display_name: "Washing Machine",
        sample_key: "washingMachine",
        default_range: (0.7, 0.9),
        lookback_share: 0.05,
    };
}

/// Ordered set of appliances. Order drives output order and tie-breaks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplianceSet {
    appliances: Vec<ApplianceDescriptor>,
}

impl ApplianceSet {
    /// Creates a set from descriptors, dropping later duplicates of a key.
    pub fn new(descriptors: impl IntoIterator<Item = ApplianceDescriptor>) -> Self {
        let mut appliances: Vec<ApplianceDescriptor> = Vec::new();
        for d in descriptors {
            if !appliances.iter().any(|a| a.key == d.key) {
                appliances.push(d);
            }
        }
        Self { appliances }
    }

    /// Electric Fan, Air Conditioner, Refrigerator.
    pub fn standard() -> Self {
        Self::new([
            ApplianceDescriptor::ELECTRIC_FAN,
            ApplianceDescriptor::AIR_CONDITIONER,
            ApplianceDescriptor::REFRIGERATOR,
        ])
    }

    /// Air Conditioner, Refrigerator, Washing Machine, Electric Fan.
    pub fn with_washing_machine() -> Self {
        Self::new([
            ApplianceDescriptor::AIR_CONDITIONER,
            ApplianceDescriptor::REFRIGERATOR,
            ApplianceDescriptor::WASHING_MACHINE,
            ApplianceDescriptor::ELECTRIC_FAN,
        ])
    }

    /// Looks up a built-in set by name (`standard` or `extended`).
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::standard()),
            "extended" => Some(Self::with_washing_machine()),
            _ => None,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApplianceDescriptor> {
        self.appliances.iter()
    }

    pub fn len(&self) -> usize {
        self.appliances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appliances.is_empty()
    }

    /// Finds a descriptor by key or display name (case-insensitive).
    pub fn find(&self, key_or_name: &str) -> Option<&ApplianceDescriptor> {
        self.appliances.iter().find(|a| {
            a.key.eq_ignore_ascii_case(key_or_name)
                || a.display_name.eq_ignore_ascii_case(key_or_name)
        })
    }
}

impl Default for ApplianceSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> IntoIterator for &'a ApplianceSet {
    type Item = &'a ApplianceDescriptor;
    type IntoIter = std::slice::Iter<'a, ApplianceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.appliances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sets_have_expected_order() {
        let keys: Vec<&str> = ApplianceSet::standard().iter().map(|a| a.key).collect();
        assert_eq!(keys, ["fan", "ac", "ref"]);
        let keys: Vec<&str> = ApplianceSet::with_washing_machine()
            .iter()
            .map(|a| a.key)
            .collect();
        assert_eq!(keys, ["ac", "ref", "wm", "fan"]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let set = ApplianceSet::new([
            ApplianceDescriptor::AIR_CONDITIONER,
            ApplianceDescriptor::AIR_CONDITIONER,
        ]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn find_by_key_or_name() {
        let set = ApplianceSet::standard();
        assert_eq!(set.find("AC").map(|a| a.key), Some("ac"));
        assert_eq!(set.find("refrigerator").map(|a| a.key), Some("ref"));
        assert!(set.find("wm").is_none());
    }
}
