//! Common math types used across gltfcomp
//!
//! Geometry buffers are stored as plain `[f32; N]` arrays so that they can be
//! compared bitwise and cast to bytes; `Vec3` is the arithmetic view used by
//! the normal and triangulation code.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// 3D vector (position, normal, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `ZERO` for a zero-length input
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Angle in radians between two vectors, 0 if either is degenerate
    pub fn angle_between(&self, other: &Self) -> f32 {
        let denom = self.length() * other.length();
        if denom <= f32::EPSILON {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set, `None` when the set is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let mut bbox = Self::new(first, first);
        for point in points {
            bbox.expand(point);
        }
        Some(bbox)
    }

    pub fn expand(&mut self, point: &[f32; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(point[i]);
            self.max[i] = self.max[i].max(point[i]);
        }
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let v1 = Vec3::new(1.0, 2.0, 3.0);
        let v2 = Vec3::new(4.0, 5.0, 6.0);

        assert!((v1.dot(&v2) - 32.0).abs() < 0.001);

        let cross = v1.cross(&v2);
        assert!((cross.x - (-3.0)).abs() < 0.001);
        assert!((cross.y - 6.0).abs() < 0.001);
        assert!((cross.z - (-3.0)).abs() < 0.001);
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        let n = Vec3::new(0.0, 3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_between() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 2.0, 0.0);
        assert!((x.angle_between(&y) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(x.angle_between(&Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_bounding_box_from_points() {
        let points = [[1.0, 2.0, 3.0], [-1.0, -2.0, -3.0], [0.0, 5.0, 0.0]];
        let bbox = BoundingBox::from_points(&points).unwrap();

        assert_eq!(bbox.min, [-1.0, -2.0, -3.0]);
        assert_eq!(bbox.max, [1.0, 5.0, 3.0]);
        assert_eq!(bbox.size(), [2.0, 7.0, 6.0]);
        assert!(BoundingBox::from_points(&[] as &[[f32; 3]]).is_none());
    }
}
