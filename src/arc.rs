//! Raised arcs on the unit sphere
//!
//! An arc is a quadratic Bezier curve in Cartesian space whose control point
//! sits above the midpoint of the two endpoints, pushed sideways by a
//! lateral bias. Every sample is pushed back onto the sphere before
//! converting to longitude/latitude. Without lateral bias the samples trace
//! the great circle; with it, sibling arcs fan out instead of overlapping.

use crate::geo::LonLat;
use std::ops::{Add, Mul, Sub};

/// Below this magnitude a vector is treated as zero.
const DEGENERATE_EPS: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Vec3> {
        let len = self.length();
        (len > DEGENERATE_EPS).then(|| self * (1.0 / len))
    }

    /// Any unit vector perpendicular to `self`.
    fn any_perpendicular(self) -> Vec3 {
        // Cross with the axis least aligned with self.
        let axis = if self.x.abs() <= self.y.abs() && self.x.abs() <= self.z.abs() {
            Vec3::new(1.0, 0.0, 0.0)
        } else if self.y.abs() <= self.z.abs() {
            Vec3::new(0.0, 1.0, 0.0)
        } else {
            Vec3::new(0.0, 0.0, 1.0)
        };
        self.cross(axis)
            .normalized()
            .unwrap_or(Vec3::new(0.0, 0.0, 1.0))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Longitude/latitude (degrees) to a point on the unit sphere.
pub fn to_unit_vector(point: LonLat) -> Vec3 {
    let (lon, lat) = (point[0].to_radians(), point[1].to_radians());
    Vec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Unit-sphere point back to longitude/latitude (degrees).
pub fn to_lon_lat(v: Vec3) -> LonLat {
    let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    [lon, lat]
}

/// Angle between two unit vectors, in radians.
pub fn angular_separation(a: Vec3, b: Vec3) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Sample `sample_count + 1` points along a raised arc from `origin` to
/// `destination`.
///
/// `curve_bias` scales the arc height (0 = default bulge) and
/// `lateral_bias` pushes the control point sideways out of the plane of the
/// two endpoints. Coincident or antipodal endpoints fall back to an
/// arbitrary perpendicular axis instead of dividing by zero.
pub fn build_arc(
    origin: LonLat,
    destination: LonLat,
    sample_count: usize,
    curve_bias: f64,
    lateral_bias: f64,
) -> Vec<LonLat> {
    let start = to_unit_vector(origin);
    let end = to_unit_vector(destination);

    if sample_count == 0 {
        return vec![to_lon_lat(start)];
    }

    let separation = angular_separation(start, end);

    let normal = start
        .cross(end)
        .normalized()
        .unwrap_or_else(|| start.any_perpendicular());
    let mid = ((start + end) * 0.5)
        .normalized()
        .unwrap_or_else(|| normal.cross(start).normalized().unwrap_or(start));

    let height = (0.25 + separation * 0.3) * (1.0 + curve_bias);
    let control = mid * (1.0 + height) + normal * (lateral_bias * 0.3);

    (0..=sample_count)
        .map(|i| {
            let t = i as f64 / sample_count as f64;
            let u = 1.0 - t;
            let p = start * (u * u) + control * (2.0 * u * t) + end * (t * t);
            to_lon_lat(p.normalized().unwrap_or(start))
        })
        .collect()
}
