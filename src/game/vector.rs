//! 2D vector math used by movement integration and breath targeting

use serde::{Deserialize, Serialize};

/// Plain 2D vector value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

pub fn length(v: Vector) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Unit vector in the direction of `v`, or `None` for the zero vector
pub fn normalize(v: Vector) -> Option<Vector> {
    let l = length(v);
    if l == 0.0 || !l.is_finite() {
        return None;
    }
    Some(Vector::new(v.x / l, v.y / l))
}

pub fn add(a: Vector, b: Vector) -> Vector {
    Vector::new(a.x + b.x, a.y + b.y)
}

/// `a - b`
pub fn subtract(a: Vector, b: Vector) -> Vector {
    Vector::new(a.x - b.x, a.y - b.y)
}

pub fn dot(a: Vector, b: Vector) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Unsigned angle between two vectors in `[0, π]`.
///
/// Returns `None` when either vector has zero length.
pub fn angle_between(a: Vector, b: Vector) -> Option<f64> {
    let na = normalize(a)?;
    let nb = normalize(b)?;
    // Rounding can push the dot product of unit vectors just past ±1.
    Some(dot(na, nb).clamp(-1.0, 1.0).acos())
}

/// Euclidean distance from `a` to `b`
pub fn distance(a: Vector, b: Vector) -> f64 {
    length(subtract(b, a))
}

/// Squared distance, for threshold comparisons that don't need the root
pub fn distance_squared(a: Vector, b: Vector) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}
