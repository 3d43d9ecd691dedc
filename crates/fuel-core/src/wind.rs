//! Wind aloft: a queryable field of wind vectors over position and altitude.

use crate::error::{FuelError, Result};
use crate::interp::lerp;
use crate::spatial::Coordinate;
use serde::{Deserialize, Serialize};

/// Horizontal wind in knots, as east/north components of where the air is going.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    pub east_kt: f64,
    pub north_kt: f64,
}

impl WindVector {
    pub const ZERO: WindVector = WindVector {
        east_kt: 0.0,
        north_kt: 0.0,
    };

    pub fn new(east_kt: f64, north_kt: f64) -> Self {
        Self { east_kt, north_kt }
    }

    /// Wind blowing from `direction_deg` (true) at `speed_kt`.
    pub fn from_direction(direction_deg: f64, speed_kt: f64) -> Self {
        let rad = direction_deg.to_radians();
        Self::new(-speed_kt * rad.sin(), -speed_kt * rad.cos())
    }

    pub fn speed(&self) -> f64 {
        self.east_kt.hypot(self.north_kt)
    }

    /// Direction the wind blows from, degrees true in `[0, 360)`.
    pub fn direction_from_deg(&self) -> f64 {
        (-self.east_kt)
            .atan2(-self.north_kt)
            .to_degrees()
            .rem_euclid(360.0)
    }

    fn lerp(&self, other: &WindVector, t: f64) -> WindVector {
        WindVector::new(
            lerp(self.east_kt, other.east_kt, t),
            lerp(self.north_kt, other.north_kt, t),
        )
    }
}

/// Wind field queried by the engine. Sampling never fails; missing data reads as zero wind.
pub trait WindTable: Send + Sync {
    fn sample(&self, coordinate: &dyn Coordinate, altitude_ft: f64) -> WindVector;

    /// False for tables that stand in for absent wind data.
    fn has_data(&self) -> bool {
        true
    }
}

/// Calm air everywhere; used when no wind data has been loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWind;

impl WindTable for NoWind {
    fn sample(&self, _coordinate: &dyn Coordinate, _altitude_ft: f64) -> WindVector {
        WindVector::ZERO
    }

    fn has_data(&self) -> bool {
        false
    }
}

/// The same wind at every position and altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformWind(pub WindVector);

impl WindTable for UniformWind {
    fn sample(&self, _coordinate: &dyn Coordinate, _altitude_ft: f64) -> WindVector {
        self.0
    }
}

/// One pressure level of gridded wind. Values are row-major, rows going north from `lat0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindLevel {
    pub altitude_ft: f64,
    pub lat0: f64,
    pub lon0: f64,
    pub step_deg: f64,
    pub rows: usize,
    pub cols: usize,
    pub east_kt: Vec<f64>,
    pub north_kt: Vec<f64>,
}

impl WindLevel {
    fn validate(&self) -> Result<()> {
        if !(self.step_deg.is_finite() && self.step_deg > 0.0) {
            return Err(FuelError::InvalidWindGrid(format!(
                "level {} ft: grid step must be positive",
                self.altitude_ft
            )));
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(FuelError::InvalidWindGrid(format!(
                "level {} ft: empty grid",
                self.altitude_ft
            )));
        }
        let expected = self.rows * self.cols;
        if self.east_kt.len() != expected || self.north_kt.len() != expected {
            return Err(FuelError::InvalidWindGrid(format!(
                "level {} ft: expected {} values per component, got {}/{}",
                self.altitude_ft,
                expected,
                self.east_kt.len(),
                self.north_kt.len()
            )));
        }
        if self
            .east_kt
            .iter()
            .chain(self.north_kt.iter())
            .any(|v| !v.is_finite())
        {
            return Err(FuelError::InvalidWindGrid(format!(
                "level {} ft: non-finite wind value",
                self.altitude_ft
            )));
        }
        Ok(())
    }

    /// Whether the columns cover the whole circle of longitude.
    fn wraps(&self) -> bool {
        (self.cols as f64 * self.step_deg - 360.0).abs() < 1e-9
    }

    fn at(&self, row: usize, col: usize) -> WindVector {
        let idx = row * self.cols + col;
        WindVector::new(self.east_kt[idx], self.north_kt[idx])
    }

    /// Bilinear sample. Positions outside the extent take the value at the nearest edge.
    fn sample(&self, lat: f64, lon: f64) -> WindVector {
        let row = ((lat - self.lat0) / self.step_deg).clamp(0.0, (self.rows - 1) as f64);
        let mut col = (lon - self.lon0) / self.step_deg;
        if self.wraps() {
            col = col.rem_euclid(self.cols as f64);
        } else {
            col = col.clamp(0.0, (self.cols - 1) as f64);
        }

        let r0 = (row.floor() as usize).min(self.rows - 1);
        let r1 = (r0 + 1).min(self.rows - 1);
        let c0 = (col.floor() as usize).min(self.cols - 1);
        let c1 = if self.wraps() {
            (c0 + 1) % self.cols
        } else {
            (c0 + 1).min(self.cols - 1)
        };
        let tr = row - r0 as f64;
        let tc = col - c0 as f64;

        let south = self.at(r0, c0).lerp(&self.at(r0, c1), tc);
        let north = self.at(r1, c0).lerp(&self.at(r1, c1), tc);
        south.lerp(&north, tr)
    }
}

/// Gridded wind at several pressure levels.
///
/// Altitudes between levels interpolate linearly and altitudes outside the
/// sampled range use the nearest level. Positions outside a level's extent
/// are clamped to its edge, so the field stays continuous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WindLevel>", into = "Vec<WindLevel>")]
pub struct GridWindTable {
    levels: Vec<WindLevel>,
}

impl TryFrom<Vec<WindLevel>> for GridWindTable {
    type Error = FuelError;

    fn try_from(levels: Vec<WindLevel>) -> Result<Self> {
        GridWindTable::new(levels)
    }
}

impl From<GridWindTable> for Vec<WindLevel> {
    fn from(table: GridWindTable) -> Self {
        table.levels
    }
}

impl GridWindTable {
    pub fn new(levels: Vec<WindLevel>) -> Result<Self> {
        if levels.is_empty() {
            return Err(FuelError::InvalidWindGrid("no pressure levels".to_string()));
        }
        for level in &levels {
            level.validate()?;
        }
        if levels
            .windows(2)
            .any(|w| w[1].altitude_ft <= w[0].altitude_ft)
        {
            return Err(FuelError::InvalidWindGrid(
                "levels must be sorted by strictly increasing altitude".to_string(),
            ));
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[WindLevel] {
        &self.levels
    }

    fn sample_level(&self, idx: usize, lat: f64, lon: f64) -> WindVector {
        self.levels[idx].sample(lat, lon)
    }
}

impl WindTable for GridWindTable {
    fn sample(&self, coordinate: &dyn Coordinate, altitude_ft: f64) -> WindVector {
        let (lat, lon) = (coordinate.lat(), coordinate.lon());
        let last = self.levels.len() - 1;
        if altitude_ft <= self.levels[0].altitude_ft {
            return self.sample_level(0, lat, lon);
        }
        if altitude_ft >= self.levels[last].altitude_ft {
            return self.sample_level(last, lat, lon);
        }
        let upper = self
            .levels
            .partition_point(|l| l.altitude_ft <= altitude_ft)
            .min(last);
        let lower = upper - 1;
        let span = self.levels[upper].altitude_ft - self.levels[lower].altitude_ft;
        let t = (altitude_ft - self.levels[lower].altitude_ft) / span;
        self.sample_level(lower, lat, lon)
            .lerp(&self.sample_level(upper, lat, lon), t)
    }
}
