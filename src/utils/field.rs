//! Rectangular workspace with movable obstacles
//!
//! Reference implementation of [`FieldBounds`]: the field spans
//! `[0, width] x [0, height]` and a point is free when it is inside the
//! rectangle and outside every obstacle.

use serde::{Deserialize, Serialize};

use crate::common::{FieldBounds, PlannerError, PlannerResult, Point2D};

/// Obstacle shapes understood by [`RectangularField`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Obstacle {
    Circle { center: Point2D, radius: f64 },
    Rectangle { min: Point2D, max: Point2D },
}

impl Obstacle {
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Obstacle::Circle { center: Point2D::new(x, y), radius }
    }

    /// Axis-aligned rectangle from two opposite corners
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Obstacle::Rectangle {
            min: Point2D::new(x0.min(x1), y0.min(y1)),
            max: Point2D::new(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        match self {
            Obstacle::Circle { center, radius } => center.distance(point) <= *radius,
            Obstacle::Rectangle { min, max } => {
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
        }
    }

    /// Shift the obstacle by `(dx, dy)`
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Obstacle::Circle { center, .. } => {
                center.x += dx;
                center.y += dy;
            }
            Obstacle::Rectangle { min, max } => {
                min.x += dx;
                min.y += dy;
                max.x += dx;
                max.y += dy;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangularField {
    width: f64,
    height: f64,
    #[serde(default)]
    obstacles: Vec<Obstacle>,
}

impl RectangularField {
    pub fn new(width: f64, height: f64) -> PlannerResult<Self> {
        if !(width > 0.0 && width.is_finite() && height > 0.0 && height.is_finite()) {
            return Err(PlannerError::InvalidParameter(format!(
                "field size must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height, obstacles: Vec::new() })
    }

    pub fn with_obstacles(mut self, obstacles: Vec<Obstacle>) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    pub fn from_yaml_str(yaml: &str) -> PlannerResult<Self> {
        let field: RectangularField = serde_yaml::from_str(yaml)?;
        Self::new(field.width, field.height).map(|f| f.with_obstacles(field.obstacles))
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Add an obstacle and return its index
    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> usize {
        self.obstacles.push(obstacle);
        self.obstacles.len() - 1
    }

    pub fn move_obstacle(&mut self, index: usize, dx: f64, dy: f64) -> PlannerResult<()> {
        let obstacle = self.obstacles.get_mut(index).ok_or_else(|| {
            PlannerError::InvalidParameter(format!("no obstacle with index {}", index))
        })?;
        obstacle.translate(dx, dy);
        Ok(())
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }
}

impl FieldBounds for RectangularField {
    fn in_field(&self, point: &Point2D) -> bool {
        let inside = point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height;
        inside && !self.obstacles.iter().any(|o| o.contains(point))
    }

    fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Point2D::new(0.0, 0.0), true)]
    #[case(Point2D::new(10.0, 10.0), true)]
    #[case(Point2D::new(-0.1, 5.0), false)]
    #[case(Point2D::new(5.0, 10.5), false)]
    #[case(Point2D::new(5.0, 5.0), false)]
    #[case(Point2D::new(2.5, 2.5), false)]
    fn test_in_field(#[case] point: Point2D, #[case] expected: bool) {
        let field = RectangularField::new(10.0, 10.0)
            .unwrap()
            .with_obstacles(vec![Obstacle::circle(5.0, 5.0, 1.0), Obstacle::rectangle(3.0, 3.0, 2.0, 2.0)]);
        assert_eq!(field.in_field(&point), expected);
    }

    #[test]
    fn test_move_obstacle() {
        let mut field = RectangularField::new(10.0, 10.0).unwrap();
        let id = field.add_obstacle(Obstacle::circle(1.0, 1.0, 0.5));
        assert!(!field.in_field(&Point2D::new(1.0, 1.0)));
        field.move_obstacle(id, 3.0, 0.0).unwrap();
        assert!(field.in_field(&Point2D::new(1.0, 1.0)));
        assert!(!field.in_field(&Point2D::new(4.0, 1.0)));
        assert!(field.move_obstacle(7, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_empty_field() {
        assert!(RectangularField::new(0.0, 5.0).is_err());
        assert!(RectangularField::new(5.0, f64::NAN).is_err());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
width: 12.0
height: 8.0
obstacles:
  - type: circle
    center: { x: 3.0, y: 3.0 }
    radius: 1.0
  - type: rectangle
    min: { x: 6.0, y: 0.0 }
    max: { x: 7.0, y: 5.0 }
"#;
        let field = RectangularField::from_yaml_str(yaml).unwrap();
        assert_eq!(field.bounds(), (12.0, 8.0));
        assert_eq!(field.obstacles().len(), 2);
        assert!(!field.in_field(&Point2D::new(6.5, 2.0)));
    }
}
