//! Common traits defining the interfaces between the planner and the vehicle

use crate::common::error::PlannerError;
use crate::common::types::*;

/// Workspace oracle answering point-in-bounds queries.
///
/// Called at high frequency inside the sampling loop, so implementations
/// must be pure.
pub trait FieldBounds {
    /// Whether `point` lies inside the field and outside every obstacle
    fn in_field(&self, point: &Point2D) -> bool;

    /// Field extent `(width, height)`, with the origin at (0, 0)
    fn bounds(&self) -> (f64, f64);
}

impl<F: FieldBounds + ?Sized> FieldBounds for &F {
    fn in_field(&self, point: &Point2D) -> bool {
        (**self).in_field(point)
    }

    fn bounds(&self) -> (f64, f64) {
        (**self).bounds()
    }
}

/// Source of the vehicle's current position (pose estimator)
pub trait PoseSource {
    fn pose(&self) -> Pose2D;

    fn position(&self) -> Point2D {
        self.pose().position()
    }
}

impl PoseSource for Pose2D {
    fn pose(&self) -> Pose2D {
        *self
    }
}

/// Consumer of planned waypoints producing a time-parameterized profile
pub trait TrajectoryGenerator {
    type Trajectory;

    fn generate(&self, request: &TrajectoryRequest) -> Self::Trajectory;
}

/// Trait for path planning algorithms
pub trait PathPlanner {
    /// Plan a path from start to goal
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<Path2D, PlannerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OpenField;

    impl FieldBounds for OpenField {
        fn in_field(&self, point: &Point2D) -> bool {
            point.x >= 0.0 && point.x <= 1.0 && point.y >= 0.0 && point.y <= 1.0
        }

        fn bounds(&self) -> (f64, f64) {
            (1.0, 1.0)
        }
    }

    fn check<F: FieldBounds>(field: F) -> bool {
        field.in_field(&Point2D::new(0.5, 0.5))
    }

    #[test]
    fn test_field_bounds_by_reference() {
        let field = OpenField;
        assert!(check(&field));
        assert_eq!((&field).bounds(), (1.0, 1.0));
    }

    #[test]
    fn test_pose_source_for_pose() {
        let pose = Pose2D::new(1.0, 2.0, 0.3);
        assert_eq!(pose.position(), Point2D::new(1.0, 2.0));
    }
}
