//! Spherical geometry for route and wind-relative calculations.
//!
//! Distances are in nautical miles and angles in decimal degrees unless a
//! function name says otherwise.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

const DEGENERATE_NORM: f64 = 1e-12;

/// Anything with a position on the earth.
pub trait Coordinate {
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;

    fn to_lat_lon(&self) -> LatLon {
        LatLon::new(self.lat(), self.lon())
    }

    fn to_vector3d(&self) -> Vector3D {
        Vector3D::from_lat_lon(self.lat(), self.lon())
    }

    fn distance_nm(&self, other: &dyn Coordinate) -> f64 {
        great_circle_distance_nm(self.lat(), self.lon(), other.lat(), other.lon())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl Coordinate for LatLon {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Cartesian vector; positions are unit vectors from the earth's centre.
///
/// x points to (0N, 0E), y to (0N, 90E) and z to the north pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        let phi = lat.to_radians();
        let lambda = lon.to_radians();
        Self::new(phi.cos() * lambda.cos(), phi.cos() * lambda.sin(), phi.sin())
    }

    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalize(&self) -> Option<Vector3D> {
        let n = self.norm();
        if n < DEGENERATE_NORM || !n.is_finite() {
            return None;
        }
        Some(*self * (1.0 / n))
    }

    pub fn to_lat_lon(&self) -> LatLon {
        let lat = self.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = self.y.atan2(self.x).to_degrees();
        LatLon::new(lat, lon)
    }

    /// Angle in radians between two position vectors.
    pub fn angle_to(&self, other: &Vector3D) -> f64 {
        self.cross(other).norm().atan2(self.dot(other))
    }

    /// Point at `fraction` of the way along the great circle from `self` to `other`.
    pub fn slerp(&self, other: &Vector3D, fraction: f64) -> Vector3D {
        let omega = self.angle_to(other);
        if omega.abs() < DEGENERATE_NORM {
            return *self;
        }
        let sin_omega = omega.sin();
        let a = ((1.0 - fraction) * omega).sin() / sin_omega;
        let b = (fraction * omega).sin() / sin_omega;
        *self * a + *other * b
    }

    /// Local unit east vector at this position.
    pub fn east(&self) -> Vector3D {
        let horizontal = (self.x * self.x + self.y * self.y).sqrt();
        if horizontal < DEGENERATE_NORM {
            // At a pole every direction is south (or north); pick the 90E meridian.
            return Vector3D::new(0.0, 1.0, 0.0);
        }
        Vector3D::new(-self.y / horizontal, self.x / horizontal, 0.0)
    }

    /// Local unit north vector at this position.
    pub fn north(&self) -> Vector3D {
        self.cross(&self.east())
    }

    /// Unit tangent at `self` of the great circle heading toward `target`.
    ///
    /// `None` when the two positions coincide or are antipodal.
    pub fn tangent_toward(&self, target: &Vector3D) -> Option<Vector3D> {
        (*target - *self * self.dot(target)).normalize()
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    fn add(self, rhs: Vector3D) -> Vector3D {
        Vector3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, rhs: Vector3D) -> Vector3D {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;

    fn neg(self) -> Vector3D {
        Vector3D::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3D {
    type Output = Vector3D;

    fn mul(self, rhs: f64) -> Vector3D {
        Vector3D::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Great-circle distance in nautical miles using the haversine formula.
pub fn great_circle_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial true course from point 1 to point 2, in degrees `[0, 360)`.
pub fn initial_course_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Offset a position by distance (nm) along an initial true course (degrees).
pub fn offset_by_bearing(lat: f64, lon: f64, distance_nm: f64, course_deg: f64) -> LatLon {
    if distance_nm.abs() <= f64::EPSILON {
        return LatLon::new(lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let bearing_rad = course_deg.to_radians();
    let angular_distance = distance_nm / EARTH_RADIUS_NM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    LatLon::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Point at `distance_nm` along the great circle from `from` to `to`.
pub fn interpolate_along(from: &dyn Coordinate, to: &dyn Coordinate, distance_nm: f64) -> LatLon {
    let total = from.distance_nm(to);
    if total <= f64::EPSILON {
        return from.to_lat_lon();
    }
    let fraction = (distance_nm / total).clamp(0.0, 1.0);
    from.to_vector3d()
        .slerp(&to.to_vector3d(), fraction)
        .to_lat_lon()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_latitude_is_about_sixty_nm() {
        let dist = great_circle_distance_nm(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 60.04).abs() < 0.01, "got {dist}");
    }

    #[test]
    fn test_same_point_distance_is_zero() {
        let dist = great_circle_distance_nm(40.6413, -73.7781, 40.6413, -73.7781);
        assert!(dist < 1e-9);
    }

    #[test]
    fn offset_by_bearing_round_trips_distance_and_course() {
        let p = offset_by_bearing(10.0, 20.0, 500.0, 60.0);
        let dist = great_circle_distance_nm(10.0, 20.0, p.lat, p.lon);
        assert!((dist - 500.0).abs() < 1e-6);
        let course = initial_course_deg(10.0, 20.0, p.lat, p.lon);
        assert!((course - 60.0).abs() < 1e-6);
    }

    #[test]
    fn east_and_north_form_local_basis() {
        let p = Vector3D::from_lat_lon(45.0, -30.0);
        let e = p.east();
        let n = p.north();
        assert!(p.dot(&e).abs() < 1e-12);
        assert!(p.dot(&n).abs() < 1e-12);
        assert!(e.dot(&n).abs() < 1e-12);
        assert!(n.z > 0.0);
    }

    #[test]
    fn tangent_on_equator_eastbound_points_east() {
        let p = Vector3D::from_lat_lon(0.0, 0.0);
        let q = Vector3D::from_lat_lon(0.0, 10.0);
        let t = p.tangent_toward(&q).unwrap();
        assert!((t.dot(&p.east()) - 1.0).abs() < 1e-12);
        assert!(t.dot(&p.north()).abs() < 1e-12);
        assert!(p.tangent_toward(&p).is_none());
    }

    #[test]
    fn interpolate_along_keeps_distance() {
        let a = LatLon::new(51.47, -0.45);
        let b = LatLon::new(40.64, -73.78);
        let mid = interpolate_along(&a, &b, 1000.0);
        assert!((a.distance_nm(&mid) - 1000.0).abs() < 1e-6);
        assert!((a.distance_nm(&mid) + mid.distance_nm(&b) - a.distance_nm(&b)).abs() < 1e-6);
    }
}
