//! Geometric primitives shared by the kinematics and the normalizer.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D point in canonical (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Origin point (0, 0)
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle in degrees of the vector from `self` to `other`.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> f32 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Round both coordinates half-up (`0.5` rounds toward positive infinity).
    #[must_use]
    pub fn round_half_up(&self) -> Self {
        Self::new(round_half_up(self.x), round_half_up(self.y))
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

pub(crate) fn round_half_up(v: f32) -> f32 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_new() {
        let p = Point::new(10.0, 20.0);
        assert_eq!(p.x, 10.0);
        assert_eq!(p.y, 20.0);
    }

    #[test]
    fn test_point_default_is_origin() {
        assert_eq!(Point::default(), Point::ORIGIN);
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_point_angle_to() {
        let origin = Point::ORIGIN;
        assert!((origin.angle_to(&Point::new(10.0, 0.0))).abs() < 0.001);
        assert!((origin.angle_to(&Point::new(0.0, 10.0)) - 90.0).abs() < 0.001);
        assert!((origin.angle_to(&Point::new(-10.0, 0.0)) - 180.0).abs() < 0.001);
        assert!((origin.angle_to(&Point::new(0.0, -10.0)) + 90.0).abs() < 0.001);
    }

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(5.0, 7.0);
        let p2 = Point::new(2.0, 3.0);
        assert_eq!(p1 + p2, Point::new(7.0, 10.0));
        assert_eq!(p1 - p2, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(1.5), 2.0);
        assert_eq!(round_half_up(1.49), 1.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(-1.51), -2.0);
        assert_eq!(Point::new(0.5, 2.4).round_half_up(), Point::new(1.0, 2.0));
    }

    proptest! {
        #[test]
        fn prop_point_distance_symmetric(x1 in -1000.0f32..1000.0, y1 in -1000.0f32..1000.0, x2 in -1000.0f32..1000.0, y2 in -1000.0f32..1000.0) {
            let p1 = Point::new(x1, y1);
            let p2 = Point::new(x2, y2);
            prop_assert!(p1.distance(&p2) >= 0.0);
            prop_assert!((p1.distance(&p2) - p2.distance(&p1)).abs() < 0.001);
        }
    }
}
