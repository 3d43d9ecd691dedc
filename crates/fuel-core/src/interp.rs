//! Clamped linear interpolation tables used by performance data.

use crate::error::{FuelError, Result};
use serde::{Deserialize, Serialize};

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Index of the lower bracket and the fraction toward the upper one.
///
/// Values outside the axis clamp to its ends.
fn bracket(axis: &[f64], x: f64) -> (usize, f64) {
    if axis.len() == 1 || x <= axis[0] {
        return (0, 0.0);
    }
    let last = axis.len() - 1;
    if x >= axis[last] {
        return (last - 1, 1.0);
    }
    let upper = axis.partition_point(|v| *v <= x).min(last);
    let lower = upper - 1;
    let t = (x - axis[lower]) / (axis[upper] - axis[lower]);
    (lower, t)
}

fn validate_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.is_empty() {
        return Err(FuelError::InvalidTable {
            table: name.to_string(),
            reason: "axis is empty".to_string(),
        });
    }
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(FuelError::InvalidTable {
            table: name.to_string(),
            reason: "axis contains a non-finite value".to_string(),
        });
    }
    if axis.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FuelError::InvalidTable {
            table: name.to_string(),
            reason: "axis must be strictly increasing".to_string(),
        });
    }
    Ok(())
}

/// y = f(x) sampled on a strictly increasing axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table1D {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Table1D {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let table = Self { x, y };
        table.validate("table")?;
        Ok(table)
    }

    pub fn constant(value: f64) -> Self {
        Self {
            x: vec![0.0],
            y: vec![value],
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        validate_axis(name, &self.x)?;
        if self.y.len() != self.x.len() {
            return Err(FuelError::InvalidTable {
                table: name.to_string(),
                reason: format!("{} values for {} axis points", self.y.len(), self.x.len()),
            });
        }
        Ok(())
    }

    pub fn value(&self, x: f64) -> f64 {
        if self.y.len() == 1 {
            return self.y[0];
        }
        let (i, t) = bracket(&self.x, x);
        lerp(self.y[i], self.y[i + 1], t)
    }
}

/// z = f(x, y) sampled on a rectangular grid; `z[i][j]` belongs to `(x[i], y[j])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table2D {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}

impl Table2D {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<Vec<f64>>) -> Result<Self> {
        let table = Self { x, y, z };
        table.validate("table")?;
        Ok(table)
    }

    pub fn constant(value: f64) -> Self {
        Self {
            x: vec![0.0],
            y: vec![0.0],
            z: vec![vec![value]],
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        validate_axis(name, &self.x)?;
        validate_axis(name, &self.y)?;
        if self.z.len() != self.x.len() || self.z.iter().any(|row| row.len() != self.y.len()) {
            return Err(FuelError::InvalidTable {
                table: name.to_string(),
                reason: format!("values must form a {}x{} grid", self.x.len(), self.y.len()),
            });
        }
        Ok(())
    }

    pub fn value(&self, x: f64, y: f64) -> f64 {
        let row_at = |i: usize| -> f64 {
            let row = &self.z[i];
            if row.len() == 1 {
                return row[0];
            }
            let (j, u) = bracket(&self.y, y);
            lerp(row[j], row[j + 1], u)
        };
        if self.z.len() == 1 {
            return row_at(0);
        }
        let (i, t) = bracket(&self.x, x);
        lerp(row_at(i), row_at(i + 1), t)
    }
}
