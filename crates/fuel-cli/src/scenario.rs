//! Scenario files: everything one fuel calculation needs, as JSON.

use crate::config::Config;
use anyhow::Context;
use fuel_core::{
    CruiseAltitude, FuelParameters, FuelReport, FuelReportGenerator, GridWindTable, NoWind,
    PlanningRules, Route, TabularProfile, UniformWind, WindTable, WindVector,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Wind source of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WindSpec {
    /// No wind data; the calculation runs in calm air.
    #[default]
    None,
    Uniform { direction_deg: f64, speed_kt: f64 },
    Grid { levels: GridWindTable },
}

impl WindSpec {
    pub fn table(&self) -> Box<dyn WindTable> {
        match self {
            WindSpec::None => Box::new(NoWind),
            WindSpec::Uniform {
                direction_deg,
                speed_kt,
            } => Box::new(UniformWind(WindVector::from_direction(
                *direction_deg,
                *speed_kt,
            ))),
            WindSpec::Grid { levels } => Box::new(levels.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub route: Route,
    /// Routes from the destination to each alternate.
    #[serde(default)]
    pub alternates: Vec<Route>,
    #[serde(default)]
    pub wind: WindSpec,
    pub profile: TabularProfile,
    pub parameters: FuelParameters,
    #[serde(default)]
    pub cruise_altitude: CruiseAltitude,
    #[serde(default)]
    pub rules: PlanningRules,
}

impl Scenario {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let scenario: Scenario = serde_json::from_str(json).context("invalid scenario JSON")?;
        scenario
            .profile
            .validate()
            .with_context(|| format!("invalid performance profile '{}'", scenario.profile.name))?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Display name: the explicit name, else origin-destination.
    pub fn title(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            format!(
                "{}-{}",
                self.route.origin().ident,
                self.route.destination().ident
            )
        })
    }

    /// Planning rules with CLI overrides applied.
    pub fn effective_rules(&self, config: &Config) -> PlanningRules {
        let mut rules = self.rules.clone();
        if let Some(direction) = config.direction {
            rules.direction = direction;
        }
        if config.intermediate_spacing_nm.is_some() {
            rules.intermediate_spacing_nm = config.intermediate_spacing_nm;
        }
        rules
    }

    pub fn run(&self, config: &Config) -> fuel_core::Result<FuelReport> {
        let wind = self.wind.table();
        tracing::info!(scenario = %self.title(), "planning scenario");
        FuelReportGenerator::new(&self.route, &self.profile, wind.as_ref(), self.parameters.clone())
            .with_alternates(&self.alternates)
            .with_cruise_altitude(self.cruise_altitude)
            .with_rules(self.effective_rules(config))
            .generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuel_core::{IntegrationDirection, WeightUnit};

    const SAMPLE: &str = include_str!("../scenarios/kjfk_egll.json");

    #[test]
    fn sample_scenario_runs() {
        let scenario = Scenario::from_json(SAMPLE).unwrap();
        assert_eq!(scenario.title(), "KJFK-EGLL");
        assert!(matches!(scenario.wind, WindSpec::Uniform { .. }));

        let report = scenario.run(&Config::default()).unwrap();
        assert!(report.trip_fuel_kg > 0.0);
        assert!(report.alternate_fuel_kg > 0.0);
        assert_eq!(report.cruise_altitude_ft % 2000.0, 1000.0);
        assert!(report.to_text(WeightUnit::Lb).contains("FUEL LB"));
    }

    #[test]
    fn config_overrides_rules() {
        let scenario = Scenario::from_json(SAMPLE).unwrap();
        let config = Config {
            direction: Some(IntegrationDirection::Forward),
            intermediate_spacing_nm: Some(200.0),
            ..Config::default()
        };
        let rules = scenario.effective_rules(&config);
        assert_eq!(rules.direction, IntegrationDirection::Forward);
        assert_eq!(rules.intermediate_spacing_nm, Some(200.0));
        assert_eq!(scenario.effective_rules(&Config::default()), scenario.rules);
    }

    #[test]
    fn missing_wind_defaults_to_calm() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value.as_object_mut().unwrap().remove("wind");
        let scenario = Scenario::from_json(&value.to_string()).unwrap();
        assert_eq!(scenario.wind, WindSpec::None);
        assert!(!scenario.wind.table().has_data());
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value["profile"]["climb_gradient"]["y"] = serde_json::json!([0.0, 0.0]);
        assert!(Scenario::from_json(&value.to_string()).is_err());
    }
}
