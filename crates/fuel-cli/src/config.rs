//! CLI configuration from environment.

use fuel_core::{IntegrationDirection, WeightUnit};
use std::env;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub weight_unit: WeightUnit,
    /// Overrides the scenario's integration direction when set.
    pub direction: Option<IntegrationDirection>,
    /// Overrides the scenario's intermediate node spacing when set.
    pub intermediate_spacing_nm: Option<f64>,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            weight_unit: lookup("FUEL_WEIGHT_UNIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            direction: lookup("FUEL_DIRECTION").and_then(|s| s.parse().ok()),
            intermediate_spacing_nm: lookup("FUEL_INTERMEDIATE_SPACING_NM")
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| *v > 0.0),
            log_json: lookup("FUEL_LOG_JSON")
                .map(|s| matches!(s.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FUEL_WEIGHT_UNIT", "lb"),
            ("FUEL_DIRECTION", "forward"),
            ("FUEL_INTERMEDIATE_SPACING_NM", "150"),
            ("FUEL_LOG_JSON", "true"),
        ]));
        assert_eq!(config.weight_unit, WeightUnit::Lb);
        assert_eq!(config.direction, Some(IntegrationDirection::Forward));
        assert_eq!(config.intermediate_spacing_nm, Some(150.0));
        assert!(config.log_json);
    }

    #[test]
    fn ignores_garbage() {
        let config = Config::from_lookup(lookup(&[
            ("FUEL_WEIGHT_UNIT", "stone"),
            ("FUEL_INTERMEDIATE_SPACING_NM", "-3"),
        ]));
        assert_eq!(config, Config::default());
    }
}
