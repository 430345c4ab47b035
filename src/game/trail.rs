//! Sparse motion history for the trail effect

use serde::Serialize;
use std::collections::VecDeque;

use super::position::PositionState;
use super::vector::{distance, Vector};

/// Retained trail sample. `dist` is the gap to the previously retained point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub dist: f64,
    pub angle: f64,
}

/// Fixed-capacity buffer, newest point first
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    points: VecDeque<TrailPoint>,
    capacity: usize,
    sample_distance: f64,
}

impl TrailBuffer {
    pub fn new(capacity: usize, sample_distance: f64) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
            sample_distance,
        }
    }

    /// Offer the current pose. Returns true if it was retained.
    pub fn record(&mut self, pos: &PositionState) -> bool {
        let dist = self
            .points
            .front()
            .map(|last| distance(pos.point(), Vector::new(last.x, last.y)))
            .unwrap_or(0.0);

        if !self.points.is_empty() && dist <= self.sample_distance {
            return false;
        }

        self.points.push_front(TrailPoint {
            x: pos.x,
            y: pos.y,
            dist,
            angle: pos.angle,
        });
        if self.points.len() > self.capacity {
            self.points.pop_back();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn newest(&self) -> Option<&TrailPoint> {
        self.points.front()
    }

    /// Newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PositionState {
        PositionState::new(x, y, 0.0)
    }

    #[test]
    fn test_first_point_always_retained() {
        let mut trail = TrailBuffer::new(10, 4.0);
        assert!(trail.record(&at(5.0, 5.0)));
        assert_eq!(trail.newest().unwrap().dist, 0.0);
    }

    #[test]
    fn test_close_points_are_skipped() {
        let mut trail = TrailBuffer::new(10, 4.0);
        trail.record(&at(0.0, 0.0));
        assert!(!trail.record(&at(3.0, 0.0)));
        assert!(!trail.record(&at(0.0, 4.0)));
        assert!(trail.record(&at(0.0, 4.5)));
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.newest().unwrap().dist, 4.5);
    }

    #[test]
    fn test_oldest_point_evicted() {
        let mut trail = TrailBuffer::new(3, 4.0);
        for i in 0..5 {
            trail.record(&at(i as f64 * 10.0, 0.0));
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![40.0, 30.0, 20.0]);
    }
}
