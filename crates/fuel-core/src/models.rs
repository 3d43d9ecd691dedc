//! Core data models consumed by the fuel engine.

use crate::error::{ensure_non_negative, FuelError, Result};
use crate::spatial::{Coordinate, LatLon};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const KG_LB_RATIO: f64 = 2.204_622_621_85;

/// A named fix on the lateral route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub ident: String,
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    pub fn new(ident: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            ident: ident.into(),
            lat,
            lon,
        }
    }

    pub fn from_coordinate(ident: impl Into<String>, coordinate: &dyn Coordinate) -> Self {
        Self::new(ident, coordinate.lat(), coordinate.lon())
    }
}

impl Coordinate for Waypoint {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Ordered lateral route from origin (first waypoint) to destination (last waypoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RouteSpec")]
pub struct Route {
    waypoints: Vec<Waypoint>,
    origin_elevation_ft: f64,
    destination_elevation_ft: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct RouteSpec {
    waypoints: Vec<Waypoint>,
    #[serde(default)]
    origin_elevation_ft: f64,
    #[serde(default)]
    destination_elevation_ft: f64,
}

impl TryFrom<RouteSpec> for Route {
    type Error = FuelError;

    fn try_from(spec: RouteSpec) -> Result<Self> {
        Route::new(spec.waypoints)?
            .with_elevations(spec.origin_elevation_ft, spec.destination_elevation_ft)
    }
}

impl Route {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(FuelError::RouteTooShort {
                count: waypoints.len(),
            });
        }
        for wpt in &waypoints {
            if !LatLon::new(wpt.lat, wpt.lon).is_valid() {
                return Err(FuelError::InvalidWaypoint {
                    ident: wpt.ident.clone(),
                    reason: format!("coordinate ({}, {}) out of range", wpt.lat, wpt.lon),
                });
            }
        }
        Ok(Self {
            waypoints,
            origin_elevation_ft: 0.0,
            destination_elevation_ft: 0.0,
        })
    }

    pub fn with_elevations(mut self, origin_ft: f64, destination_ft: f64) -> Result<Self> {
        ensure_non_negative("origin_elevation_ft", origin_ft)?;
        ensure_non_negative("destination_elevation_ft", destination_ft)?;
        self.origin_elevation_ft = origin_ft;
        self.destination_elevation_ft = destination_ft;
        Ok(self)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn origin(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    pub fn destination(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }

    pub fn origin_elevation_ft(&self) -> f64 {
        self.origin_elevation_ft
    }

    pub fn destination_elevation_ft(&self) -> f64 {
        self.destination_elevation_ft
    }

    /// Great-circle distance of each leg, in route order.
    pub fn leg_distances_nm(&self) -> Vec<f64> {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance_nm(&pair[1]))
            .collect()
    }

    pub fn total_distance_nm(&self) -> f64 {
        self.leg_distances_nm().iter().sum()
    }

    /// Direct origin-to-destination distance.
    pub fn direct_distance_nm(&self) -> f64 {
        self.origin().distance_nm(self.destination())
    }
}

/// Trip-supplied fuel policy. Times are in minutes, quantities in kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelParameters {
    /// Zero fuel weight.
    pub zfw_kg: f64,
    /// Contingency fuel as a percentage of trip fuel, `[0, 100]`.
    pub contingency_pct: f64,
    pub final_reserve_min: f64,
    pub taxi_min: f64,
    pub apu_min: f64,
    pub hold_min: f64,
    pub extra_kg: f64,
    /// Tank capacity; exceeding it fails the calculation.
    pub max_fuel_kg: Option<f64>,
}

impl Default for FuelParameters {
    fn default() -> Self {
        Self {
            zfw_kg: 0.0,
            contingency_pct: 5.0,
            final_reserve_min: 30.0,
            taxi_min: 20.0,
            apu_min: 30.0,
            hold_min: 0.0,
            extra_kg: 0.0,
            max_fuel_kg: None,
        }
    }
}

impl FuelParameters {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("zfw_kg", self.zfw_kg)?;
        if self.zfw_kg == 0.0 {
            return Err(FuelError::InvalidParameter {
                name: "zfw_kg",
                value: self.zfw_kg,
                reason: "must be positive",
            });
        }
        ensure_non_negative("contingency_pct", self.contingency_pct)?;
        if self.contingency_pct > 100.0 {
            return Err(FuelError::InvalidParameter {
                name: "contingency_pct",
                value: self.contingency_pct,
                reason: "must not exceed 100",
            });
        }
        ensure_non_negative("final_reserve_min", self.final_reserve_min)?;
        ensure_non_negative("taxi_min", self.taxi_min)?;
        ensure_non_negative("apu_min", self.apu_min)?;
        ensure_non_negative("hold_min", self.hold_min)?;
        ensure_non_negative("extra_kg", self.extra_kg)?;
        if let Some(max) = self.max_fuel_kg {
            ensure_non_negative("max_fuel_kg", max)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn from_kg(self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lb => kg * KG_LB_RATIO,
        }
    }

    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => value / KG_LB_RATIO,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => write!(f, "KG"),
            WeightUnit::Lb => write!(f, "LB"),
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lb),
            other => Err(format!("unknown weight unit '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FuelParameters {
        FuelParameters {
            zfw_kg: 60_000.0,
            ..FuelParameters::default()
        }
    }

    #[test]
    fn route_requires_origin_and_destination() {
        let err = Route::new(vec![Waypoint::new("KJFK", 40.64, -73.78)]).unwrap_err();
        assert_eq!(err, FuelError::RouteTooShort { count: 1 });
        assert!(Route::new(Vec::new()).is_err());
    }

    #[test]
    fn route_rejects_out_of_range_coordinates() {
        let err = Route::new(vec![
            Waypoint::new("A", 0.0, 0.0),
            Waypoint::new("B", 91.0, 0.0),
        ])
        .unwrap_err();
        assert!(matches!(err, FuelError::InvalidWaypoint { ident, .. } if ident == "B"));
    }

    #[test]
    fn route_deserializes_with_validation() {
        let route: Route = serde_json::from_str(
            r#"{"waypoints":[{"ident":"A","lat":0,"lon":0},{"ident":"B","lat":0,"lon":1}],
                "origin_elevation_ft":13}"#,
        )
        .unwrap();
        assert_eq!(route.origin_elevation_ft(), 13.0);
        assert!(serde_json::from_str::<Route>(r#"{"waypoints":[]}"#).is_err());
    }

    #[test]
    fn default_parameters_follow_planning_defaults() {
        let p = FuelParameters::default();
        assert_eq!(p.contingency_pct, 5.0);
        assert_eq!(p.final_reserve_min, 30.0);
        assert_eq!(p.taxi_min, 20.0);
        assert_eq!(p.apu_min, 30.0);
        assert_eq!(p.hold_min, 0.0);
        assert_eq!(p.extra_kg, 0.0);
    }

    #[test]
    fn validate_rejects_bad_contingency_and_zfw() {
        assert!(params().validate().is_ok());
        let mut p = params();
        p.contingency_pct = 101.0;
        assert!(matches!(
            p.validate(),
            Err(FuelError::InvalidParameter { name: "contingency_pct", .. })
        ));
        let mut p = params();
        p.zfw_kg = 0.0;
        assert!(p.validate().is_err());
        let mut p = params();
        p.hold_min = -5.0;
        assert!(matches!(
            p.validate(),
            Err(FuelError::InvalidParameter { name: "hold_min", .. })
        ));
    }

    #[test]
    fn weight_unit_conversion() {
        assert_eq!(WeightUnit::Kg.from_kg(1000.0), 1000.0);
        assert!((WeightUnit::Lb.from_kg(1000.0) - 2204.62).abs() < 0.01);
        assert!((WeightUnit::Lb.to_kg(WeightUnit::Lb.from_kg(1234.0)) - 1234.0).abs() < 1e-9);
        assert_eq!("LB".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
    }
}
