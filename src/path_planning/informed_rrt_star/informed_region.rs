//! Informed sampling region
//!
//! Once a path of length `c_best` exists, only points inside the ellipse
//! with foci at start and goal and major axis `c_best` can shorten it.

use nalgebra::{Rotation2, Vector2};

use crate::common::Point2D;

/// Slack for the focal-sum membership test
const CONTAINS_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct InformedRegion {
    start_position: Point2D,
    end_position: Point2D,
    center: Point2D,
    straight_line_distance: f64,
    current_best_path_length: f64,
    width: f64,
    height: f64,
    rotation: Rotation2<f64>,
}

impl InformedRegion {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        let mut region = InformedRegion {
            start_position: start,
            end_position: end,
            center: start,
            straight_line_distance: 0.0,
            current_best_path_length: f64::INFINITY,
            width: f64::INFINITY,
            height: f64::INFINITY,
            rotation: Rotation2::identity(),
        };
        region.setup(start, end);
        region
    }

    /// Reset the region for a new start/end pair, forgetting any best path.
    pub fn setup(&mut self, start: Point2D, end: Point2D) {
        let shifted = end.to_vector() - start.to_vector();
        self.start_position = start;
        self.end_position = end;
        self.center = Point2D::from((start.to_vector() + end.to_vector()) / 2.0);
        self.straight_line_distance = shifted.norm();
        // atan2(0, 0) is 0, so a degenerate start == end keeps the identity
        self.rotation = Rotation2::new(shifted.y.atan2(shifted.x));
        self.current_best_path_length = f64::INFINITY;
        self.width = f64::INFINITY;
        self.height = f64::INFINITY;
    }

    /// Shrink the ellipse to a newly found best path length.
    pub fn update(&mut self, best_path_length: f64) {
        let c_best = best_path_length.max(0.0);
        let residual = c_best * c_best - self.straight_line_distance * self.straight_line_distance;
        self.current_best_path_length = c_best;
        self.width = c_best;
        self.height = residual.max(0.0).sqrt();
    }

    /// Map a unit-disk pair to a point inside the oriented ellipse.
    pub fn sample(&self, rho: f64, theta: f64) -> Point2D {
        let local = Vector2::new(
            theta.cos() * self.width / 2.0 * rho,
            theta.sin() * self.height / 2.0 * rho,
        );
        Point2D::from(self.rotation * local + self.center.to_vector())
    }

    /// Whether `point` could still lie on a shorter path.
    ///
    /// Every point is relevant until a path has been found.
    pub fn contains(&self, point: &Point2D) -> bool {
        if !self.is_informed() {
            return true;
        }
        let focal_sum = self.start_position.distance(point) + self.end_position.distance(point);
        focal_sum <= self.current_best_path_length + CONTAINS_EPS
    }

    pub fn is_informed(&self) -> bool {
        self.current_best_path_length.is_finite()
    }

    pub fn start_position(&self) -> Point2D {
        self.start_position
    }

    pub fn end_position(&self) -> Point2D {
        self.end_position
    }

    pub fn center(&self) -> Point2D {
        self.center
    }

    pub fn straight_line_distance(&self) -> f64 {
        self.straight_line_distance
    }

    pub fn current_best_path_length(&self) -> f64 {
        self.current_best_path_length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Heading of the major axis [rad]
    pub fn heading(&self) -> f64 {
        self.rotation.angle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_setup() {
        let region = InformedRegion::new(Point2D::new(0.0, 0.0), Point2D::new(4.0, 4.0));
        assert_eq!(region.start_position(), Point2D::new(0.0, 0.0));
        assert_eq!(region.end_position(), Point2D::new(4.0, 4.0));
        assert_eq!(region.center(), Point2D::new(2.0, 2.0));
        assert_relative_eq!(region.straight_line_distance(), 32.0_f64.sqrt());
        assert_relative_eq!(region.heading(), FRAC_PI_4);
        assert!(!region.is_informed());
        assert!(region.contains(&Point2D::new(100.0, -100.0)));
    }

    #[test]
    fn test_update_height() {
        let mut region = InformedRegion::new(Point2D::new(0.0, 0.0), Point2D::new(8.0, 0.0));
        region.update(10.0);
        assert_relative_eq!(region.width(), 10.0);
        assert_relative_eq!(region.height(), 6.0);
        assert!(region.is_informed());
    }

    #[rstest]
    #[case(0.0)]
    #[case(1e-12)]
    #[case(-1e-9)]
    fn test_update_never_nan_near_straight_line(#[case] slack: f64) {
        let start = Point2D::new(0.3, 0.7);
        let end = Point2D::new(9.1, 8.9);
        let mut region = InformedRegion::new(start, end);
        region.update(start.distance(&end) + slack);
        assert!(!region.height().is_nan());
        assert!(region.height() >= 0.0);
    }

    #[test]
    fn test_degenerate_start_equals_end() {
        let p = Point2D::new(2.0, 3.0);
        let mut region = InformedRegion::new(p, p);
        region.update(0.0);
        assert_eq!(region.height(), 0.0);
        assert_eq!(region.sample(0.7, 1.3), p);
    }

    #[test]
    fn test_sample_axes() {
        let mut region = InformedRegion::new(Point2D::new(0.0, 0.0), Point2D::new(0.0, 8.0));
        region.update(10.0);
        // major axis points along +y
        let tip = region.sample(1.0, 0.0);
        assert_relative_eq!(tip.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(tip.y, 9.0, epsilon = 1e-12);
        let side = region.sample(1.0, FRAC_PI_2);
        assert_relative_eq!(side.x, -3.0, epsilon = 1e-12);
        assert_relative_eq!(side.y, 4.0, epsilon = 1e-12);
        assert_eq!(region.sample(0.0, PI), region.center());
    }

    #[test]
    fn test_samples_inside_ellipse() {
        let mut region = InformedRegion::new(Point2D::new(1.0, 2.0), Point2D::new(7.0, 5.0));
        region.update(9.0);
        for i in 0..50 {
            let rho = i as f64 / 50.0;
            let theta = i as f64 * 0.37;
            assert!(region.contains(&region.sample(rho, theta)));
        }
        assert!(!region.contains(&Point2D::new(-5.0, -5.0)));
    }
}
