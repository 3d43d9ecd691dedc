//! Planning policy and numeric thresholds for the fuel engine.

use serde::{Deserialize, Serialize};

/// Direction of the trip-fuel sweep over the plan nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationDirection {
    /// Anchor at the destination with the known landing weight and sweep toward the origin.
    #[default]
    Backward,
    /// Anchor at the origin with an estimated takeoff weight and sweep toward the destination.
    Forward,
}

impl std::str::FromStr for IntegrationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backward" => Ok(IntegrationDirection::Backward),
            "forward" => Ok(IntegrationDirection::Forward),
            other => Err(format!("unknown integration direction '{other}'")),
        }
    }
}

/// Configuration for a fuel calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningRules {
    pub direction: IntegrationDirection,
    /// Split route legs longer than this into equal sub-legs (nm). `None` disables.
    pub intermediate_spacing_nm: Option<f64>,
    /// Trip fuel change (kg) below which the reserve/trip iteration stops
    pub convergence_tolerance_kg: f64,
    pub max_iterations: usize,
    /// Pressure altitude for destination holding (ft)
    pub hold_altitude_ft: f64,
    /// Pressure altitude for final reserve holding (ft)
    pub final_reserve_altitude_ft: f64,
    /// Step between flight levels tried by the optimum cruise policy (ft)
    pub cruise_level_step_ft: f64,
    /// Sampling interval of the average wind estimator (nm)
    pub avg_wind_sample_spacing_nm: f64,
}

impl Default for PlanningRules {
    fn default() -> Self {
        Self {
            direction: IntegrationDirection::Backward,
            intermediate_spacing_nm: None,
            convergence_tolerance_kg: 0.01,
            max_iterations: 30,
            hold_altitude_ft: 1500.0,
            final_reserve_altitude_ft: 1500.0,
            cruise_level_step_ft: 2000.0,
            avg_wind_sample_spacing_nm: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_rules_fill_from_defaults() {
        let rules: PlanningRules =
            serde_json::from_str(r#"{"direction":"forward","intermediate_spacing_nm":250}"#)
                .unwrap();
        assert_eq!(rules.direction, IntegrationDirection::Forward);
        assert_eq!(rules.intermediate_spacing_nm, Some(250.0));
        assert_eq!(rules.max_iterations, PlanningRules::default().max_iterations);
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!(
            "Forward".parse::<IntegrationDirection>().unwrap(),
            IntegrationDirection::Forward
        );
        assert!("sideways".parse::<IntegrationDirection>().is_err());
    }
}
