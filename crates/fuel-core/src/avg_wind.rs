//! Coarse along-track wind estimate between two points, used to bias route search.
//!
//! Advisory only: nothing here feeds the fuel integration.

use crate::error::{FuelError, Result};
use crate::perf::PerformanceProfile;
use crate::plan_node::{ground_speed, track_at};
use crate::spatial::{interpolate_along, Coordinate};
use crate::speed::ktas;
use crate::wind::WindTable;

const DEFAULT_SAMPLE_SPACING_NM: f64 = 100.0;

pub struct AvgWindCalculator<'a> {
    wind: &'a dyn WindTable,
    ktas: f64,
    alt_ft: f64,
    sample_spacing_nm: f64,
}

impl<'a> AvgWindCalculator<'a> {
    pub fn new(wind: &'a dyn WindTable, ktas: f64, alt_ft: f64) -> Self {
        Self {
            wind,
            ktas,
            alt_ft,
            sample_spacing_nm: DEFAULT_SAMPLE_SPACING_NM,
        }
    }

    /// Calculator for a city pair, cruising at the profile's recommended altitude for the distance.
    pub fn for_city_pair(
        wind: &'a dyn WindTable,
        profile: &dyn PerformanceProfile,
        zfw: f64,
        origin: &dyn Coordinate,
        destination: &dyn Coordinate,
    ) -> Self {
        let distance = origin.distance_nm(destination);
        let alt_ft = profile.estimated_cruise_altitude(distance, zfw);
        let tas = ktas(profile.cruise_kias(zfw), alt_ft);
        tracing::debug!(distance, alt_ft, tas, "average wind calculator");
        Self::new(wind, tas, alt_ft)
    }

    pub fn with_sample_spacing(mut self, spacing_nm: f64) -> Self {
        if spacing_nm > 0.0 && spacing_nm.is_finite() {
            self.sample_spacing_nm = spacing_nm;
        }
        self
    }

    pub fn ktas(&self) -> f64 {
        self.ktas
    }

    pub fn alt_ft(&self) -> f64 {
        self.alt_ft
    }

    /// Mean of (GS − TAS) over samples along the great circle, both endpoints included.
    pub fn average_wind_component(&self, from: &dyn Coordinate, to: &dyn Coordinate) -> Result<f64> {
        let distance = from.distance_nm(to);
        let segments = (distance / self.sample_spacing_nm).ceil().max(1.0) as usize;
        let (start, end) = (from.to_vector3d(), to.to_vector3d());

        let mut sum = 0.0;
        for k in 0..=segments {
            let here = interpolate_along(from, to, distance * k as f64 / segments as f64);
            let wind = self.wind.sample(&here, self.alt_ft);
            let track = track_at(&here.to_vector3d(), &start, &end);
            let gs = ground_speed(self.ktas, wind, track);
            if !(gs > 0.0) {
                return Err(FuelError::NonPositiveGroundSpeed {
                    leg: k,
                    from: format!("({:.3}, {:.3})", here.lat, here.lon),
                    ground_speed: gs,
                });
            }
            sum += gs - self.ktas;
        }
        Ok(sum / (segments + 1) as f64)
    }

    /// Still-air distance equivalent to flying from `from` to `to` in the sampled wind.
    pub fn air_distance(&self, from: &dyn Coordinate, to: &dyn Coordinate) -> Result<f64> {
        let delta = self.average_wind_component(from, to)?;
        let gs = self.ktas + delta;
        if !(gs > 0.0) {
            return Err(FuelError::NonPositiveGroundSpeed {
                leg: 0,
                from: "average".to_string(),
                ground_speed: gs,
            });
        }
        Ok(from.distance_nm(to) * self.ktas / gs)
    }
}
