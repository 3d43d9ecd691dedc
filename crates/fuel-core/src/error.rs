//! Typed failures of a fuel calculation.

use thiserror::Error;

/// Coarse grouping of [`FuelError`] variants, used by callers to pick user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The aircraft cannot reach and leave a cruise altitude on this route.
    InfeasibleProfile,
    /// Malformed route, parameters or wind data.
    InvalidInput,
    /// The integration itself ran into an inconsistent state.
    Computation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuelError {
    #[error(
        "cannot find a valid cruising altitude: climb {climb_nm:.1} nm + descent {descent_nm:.1} nm exceeds route distance {route_nm:.1} nm"
    )]
    InfeasibleProfile {
        cruise_altitude_ft: f64,
        climb_nm: f64,
        descent_nm: f64,
        route_nm: f64,
    },

    #[error("route must contain at least 2 waypoints, got {count}")]
    RouteTooShort { count: usize },

    #[error("invalid waypoint {ident}: {reason}")]
    InvalidWaypoint { ident: String, reason: String },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid wind grid: {0}")]
    InvalidWindGrid(String),

    #[error("invalid performance table {table}: {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("non-positive ground speed {ground_speed:.1} kt on leg {leg} from {from}")]
    NonPositiveGroundSpeed {
        leg: usize,
        from: String,
        ground_speed: f64,
    },

    #[error("fuel on board would reach {fuel_on_board:.1} kg on leg {leg}")]
    FuelExhausted { leg: usize, fuel_on_board: f64 },

    #[error("fuel integration did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("fuel required {required_kg:.0} kg exceeds tank capacity {capacity_kg:.0} kg")]
    FuelCapacityExceeded { required_kg: f64, capacity_kg: f64 },
}

impl FuelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FuelError::InfeasibleProfile { .. } => ErrorKind::InfeasibleProfile,
            FuelError::RouteTooShort { .. }
            | FuelError::InvalidWaypoint { .. }
            | FuelError::InvalidParameter { .. }
            | FuelError::InvalidWindGrid(_)
            | FuelError::InvalidTable { .. }
            | FuelError::NonPositiveGroundSpeed { .. } => ErrorKind::InvalidInput,
            FuelError::FuelExhausted { .. }
            | FuelError::NotConverged { .. }
            | FuelError::FuelCapacityExceeded { .. } => ErrorKind::Computation,
        }
    }
}

pub type Result<T> = std::result::Result<T, FuelError>;

/// Fail with [`FuelError::InvalidParameter`] unless `value` is finite and non-negative.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(FuelError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value < 0.0 {
        return Err(FuelError::InvalidParameter {
            name,
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}
