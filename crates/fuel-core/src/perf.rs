//! Aircraft performance data consumed read-only by the engine.

use crate::error::{FuelError, Result};
use crate::interp::{Table1D, Table2D};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightPhase {
    Climb,
    Cruise,
    Descent,
    Hold,
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlightPhase::Climb => "CLB",
            FlightPhase::Cruise => "CRZ",
            FlightPhase::Descent => "DES",
            FlightPhase::Hold => "HLD",
        };
        f.write_str(s)
    }
}

/// Per-aircraft-type performance. Weights in kg, altitudes in ft, speeds in KIAS.
pub trait PerformanceProfile: Send + Sync {
    /// Fuel flow in kg/min.
    fn fuel_flow(&self, phase: FlightPhase, gross_weight: f64, alt_ft: f64, kias: f64) -> f64;

    /// Altitude gained per nm flown during climb (ft/nm).
    fn climb_gradient(&self, gross_weight: f64) -> f64;

    /// Altitude lost per nm flown during descent (ft/nm).
    fn descent_gradient(&self, gross_weight: f64) -> f64;

    fn climb_kias(&self, gross_weight: f64) -> f64;
    fn cruise_kias(&self, gross_weight: f64) -> f64;
    fn descent_kias(&self, gross_weight: f64) -> f64;
    fn hold_kias(&self, gross_weight: f64) -> f64;

    fn max_cruise_altitude(&self, gross_weight: f64) -> f64;

    /// Recommended cruise altitude for a trip of `distance_nm` at zero fuel weight `zfw`.
    fn estimated_cruise_altitude(&self, distance_nm: f64, zfw: f64) -> f64;

    /// Taxi fuel flow, kg/min.
    fn taxi_fuel_flow(&self) -> f64;

    /// APU fuel flow, kg/min.
    fn apu_fuel_flow(&self) -> f64;

    fn kias(&self, phase: FlightPhase, gross_weight: f64) -> f64 {
        match phase {
            FlightPhase::Climb => self.climb_kias(gross_weight),
            FlightPhase::Cruise => self.cruise_kias(gross_weight),
            FlightPhase::Descent => self.descent_kias(gross_weight),
            FlightPhase::Hold => self.hold_kias(gross_weight),
        }
    }
}

/// Fuel-flow table over (gross weight, altitude).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelFlowTables {
    pub climb: Table2D,
    pub cruise: Table2D,
    pub descent: Table2D,
    pub hold: Table2D,
}

impl FuelFlowTables {
    fn get(&self, phase: FlightPhase) -> &Table2D {
        match phase {
            FlightPhase::Climb => &self.climb,
            FlightPhase::Cruise => &self.cruise,
            FlightPhase::Descent => &self.descent,
            FlightPhase::Hold => &self.hold,
        }
    }
}

/// Table-driven profile, loadable from JSON.
///
/// Fuel flow is looked up on (weight, altitude); the speed argument is
/// ignored because each table already encodes its phase's speed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularProfile {
    pub name: String,
    /// kg/min tables keyed by (gross weight kg, altitude ft)
    pub fuel_flow: FuelFlowTables,
    /// ft/nm by gross weight
    pub climb_gradient: Table1D,
    /// ft/nm by gross weight
    pub descent_gradient: Table1D,
    pub climb_kias: Table1D,
    pub cruise_kias: Table1D,
    pub descent_kias: Table1D,
    pub hold_kias: Table1D,
    /// ft by gross weight
    pub max_cruise_altitude: Table1D,
    /// ft by (trip distance nm, zfw kg)
    pub optimum_cruise_altitude: Table2D,
    pub taxi_flow_kg_min: f64,
    pub apu_flow_kg_min: f64,
}

impl TabularProfile {
    pub fn validate(&self) -> Result<()> {
        self.fuel_flow.climb.validate("fuel_flow.climb")?;
        self.fuel_flow.cruise.validate("fuel_flow.cruise")?;
        self.fuel_flow.descent.validate("fuel_flow.descent")?;
        self.fuel_flow.hold.validate("fuel_flow.hold")?;
        self.climb_gradient.validate("climb_gradient")?;
        self.descent_gradient.validate("descent_gradient")?;
        self.climb_kias.validate("climb_kias")?;
        self.cruise_kias.validate("cruise_kias")?;
        self.descent_kias.validate("descent_kias")?;
        self.hold_kias.validate("hold_kias")?;
        self.max_cruise_altitude.validate("max_cruise_altitude")?;
        self.optimum_cruise_altitude
            .validate("optimum_cruise_altitude")?;

        for (name, table) in [
            ("climb_gradient", &self.climb_gradient),
            ("descent_gradient", &self.descent_gradient),
        ] {
            if table.y.iter().any(|v| !(*v > 0.0)) {
                return Err(FuelError::InvalidTable {
                    table: name.to_string(),
                    reason: "gradients must be positive".to_string(),
                });
            }
        }
        for (name, value) in [
            ("taxi_flow_kg_min", self.taxi_flow_kg_min),
            ("apu_flow_kg_min", self.apu_flow_kg_min),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FuelError::InvalidTable {
                    table: name.to_string(),
                    reason: format!("flow {value} must be finite and non-negative"),
                });
            }
        }
        Ok(())
    }
}

impl PerformanceProfile for TabularProfile {
    fn fuel_flow(&self, phase: FlightPhase, gross_weight: f64, alt_ft: f64, _kias: f64) -> f64 {
        self.fuel_flow.get(phase).value(gross_weight, alt_ft)
    }

    fn climb_gradient(&self, gross_weight: f64) -> f64 {
        self.climb_gradient.value(gross_weight)
    }

    fn descent_gradient(&self, gross_weight: f64) -> f64 {
        self.descent_gradient.value(gross_weight)
    }

    fn climb_kias(&self, gross_weight: f64) -> f64 {
        self.climb_kias.value(gross_weight)
    }

    fn cruise_kias(&self, gross_weight: f64) -> f64 {
        self.cruise_kias.value(gross_weight)
    }

    fn descent_kias(&self, gross_weight: f64) -> f64 {
        self.descent_kias.value(gross_weight)
    }

    fn hold_kias(&self, gross_weight: f64) -> f64 {
        self.hold_kias.value(gross_weight)
    }

    fn max_cruise_altitude(&self, gross_weight: f64) -> f64 {
        self.max_cruise_altitude.value(gross_weight)
    }

    fn estimated_cruise_altitude(&self, distance_nm: f64, zfw: f64) -> f64 {
        self.optimum_cruise_altitude.value(distance_nm, zfw)
    }

    fn taxi_fuel_flow(&self) -> f64 {
        self.taxi_flow_kg_min
    }

    fn apu_fuel_flow(&self) -> f64 {
        self.apu_flow_kg_min
    }
}
