//! Player pose within the arena

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::vector::Vector;

/// Position and facing. `angle` is kept in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionState {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl PositionState {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        let mut p = Self { x, y, angle };
        p.normalize_angle();
        p
    }

    pub fn point(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    /// Wrap `angle` into `[0, 2π)`
    pub fn normalize_angle(&mut self) {
        let a = self.angle.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        self.angle = if a >= TAU { 0.0 } else { a };
    }

    /// Hard arena boundary, no bounce
    pub fn clamp_to(&mut self, width: f64, height: f64) {
        self.x = self.x.clamp(0.0, width);
        self.y = self.y.clamp(0.0, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_range() {
        let mut p = PositionState::new(0.0, 0.0, -0.5);
        assert!((p.angle - (TAU - 0.5)).abs() < 1e-12);

        p.angle = TAU + 1.0;
        p.normalize_angle();
        assert!((p.angle - 1.0).abs() < 1e-12);

        p.angle = -1e-18;
        p.normalize_angle();
        assert!(p.angle >= 0.0 && p.angle < TAU);
    }

    #[test]
    fn test_clamp_to_arena() {
        let mut p = PositionState::new(-3.0, 900.0, 0.0);
        p.clamp_to(800.0, 600.0);
        assert_eq!((p.x, p.y), (0.0, 600.0));
    }
}
