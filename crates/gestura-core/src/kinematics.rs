//! Pure kinematic functions over pointer coordinate sets.
//!
//! None of these functions hold state. Degenerate inputs (coincident points,
//! zero elapsed time) produce neutral values instead of NaN or infinity.

use crate::geometry::{round_half_up, Point};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Direction of travel, encoded as a bitmask so that a recognizer's
    /// allowed directions can be tested with a bitwise AND.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Direction: u8 {
        /// No movement
        const NONE = 1;
        /// Toward negative x
        const LEFT = 1 << 1;
        /// Toward positive x
        const RIGHT = 1 << 2;
        /// Toward negative y
        const UP = 1 << 3;
        /// Toward positive y
        const DOWN = 1 << 4;
        /// Left or right
        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
        /// Up or down
        const VERTICAL = Self::UP.bits() | Self::DOWN.bits();
        /// Any movement
        const ALL = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::NONE
    }
}

impl Direction {
    /// Event-name suffix for a single direction (`"left"`, `"up"`, ...).
    ///
    /// Composite masks and `NONE` have no suffix.
    #[must_use]
    pub fn suffix(self) -> Option<&'static str> {
        if self == Self::LEFT {
            Some("left")
        } else if self == Self::RIGHT {
            Some("right")
        } else if self == Self::UP {
            Some("up")
        } else if self == Self::DOWN {
            Some("down")
        } else {
            None
        }
    }
}

/// Velocity sample in pixels per millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    /// Horizontal component
    pub x: f32,
    /// Vertical component
    pub y: f32,
}

impl Velocity {
    /// The component with the larger magnitude, sign preserved.
    #[must_use]
    pub fn dominant(&self) -> f32 {
        if self.x.abs() > self.y.abs() {
            self.x
        } else {
            self.y
        }
    }
}

/// Center of a set of points, rounded half-up.
///
/// An empty set yields the origin.
#[must_use]
pub fn center(points: &[Point]) -> Point {
    match points {
        [] => Point::ORIGIN,
        [single] => single.round_half_up(),
        _ => {
            let n = points.len() as f32;
            let (sx, sy) = points
                .iter()
                .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
            Point::new(round_half_up(sx / n), round_half_up(sy / n))
        }
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(p1: Point, p2: Point) -> f32 {
    p1.distance(&p2)
}

/// Angle in degrees of the vector `p1 -> p2`.
#[must_use]
pub fn angle(p1: Point, p2: Point) -> f32 {
    p1.angle_to(&p2)
}

/// Rotation in degrees between two two-pointer sets.
///
/// Each pair's angle is taken from its second pointer to its first. Fewer
/// than two pointers in either set yields `0`.
#[must_use]
pub fn rotation(start: &[Point], end: &[Point]) -> f32 {
    match (start, end) {
        ([s0, s1, ..], [e0, e1, ..]) => angle(*e1, *e0) - angle(*s1, *s0),
        _ => 0.0,
    }
}

/// Scale factor between two two-pointer sets.
///
/// A zero-length baseline or fewer than two pointers yields `1`.
#[must_use]
pub fn scale(start: &[Point], end: &[Point]) -> f32 {
    match (start, end) {
        ([s0, s1, ..], [e0, e1, ..]) => {
            let value = distance(*e0, *e1) / distance(*s0, *s1);
            if value.is_finite() {
                value
            } else {
                1.0
            }
        }
        _ => 1.0,
    }
}

/// Velocity over `delta_time` milliseconds; non-finite components become 0.
#[must_use]
pub fn velocity(delta_time: u64, dx: f32, dy: f32) -> Velocity {
    let dt = delta_time as f32;
    let finite_or_zero = |v: f32| if v.is_finite() { v } else { 0.0 };
    Velocity {
        x: finite_or_zero(dx / dt),
        y: finite_or_zero(dy / dt),
    }
}

/// Coarse direction of travel for a displacement.
///
/// Equal components give `NONE`. Otherwise the larger axis wins and a tie in
/// magnitude goes to the horizontal axis.
#[must_use]
pub fn direction(dx: f32, dy: f32) -> Direction {
    if dx == dy {
        return Direction::NONE;
    }
    if dx.abs() >= dy.abs() {
        if dx < 0.0 {
            Direction::LEFT
        } else {
            Direction::RIGHT
        }
    } else if dy < 0.0 {
        Direction::UP
    } else {
        Direction::DOWN
    }
}
