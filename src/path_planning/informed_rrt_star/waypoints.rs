//! Hand-off of planned waypoints to a trajectory generator

use crate::common::{Path2D, Point2D, Pose2D, TrajectoryRequest};

/// Package `path` for a trajectory generator starting at `pose`.
///
/// The first waypoint is dropped when the vehicle is already within
/// `skip_distance` of it, and the end heading follows the last segment.
/// Returns `None` for an empty path.
pub fn trajectory_request(path: &Path2D, pose: &Pose2D, skip_distance: f64) -> Option<TrajectoryRequest> {
    let end = *path.last()?;
    let mut interior: Vec<Point2D> = path.points[..path.len() - 1].to_vec();
    if interior
        .first()
        .map_or(false, |first| first.distance(&pose.position()) < skip_distance)
    {
        interior.remove(0);
    }

    let before_end = interior.last().copied().unwrap_or_else(|| pose.position());
    let dx = end.x - before_end.x;
    let dy = end.y - before_end.y;
    let yaw = if dx.hypot(dy) > f64::EPSILON { dy.atan2(dx) } else { pose.yaw };

    Some(TrajectoryRequest {
        start: *pose,
        interior,
        end: Pose2D::from_position(end, yaw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn path(points: &[(f64, f64)]) -> Path2D {
        Path2D::from_points(points.iter().map(|&p| Point2D::from(p)).collect())
    }

    #[test]
    fn test_drops_first_waypoint_at_vehicle() {
        let pose = Pose2D::new(0.0, 0.0, 0.0);
        let request = trajectory_request(&path(&[(0.1, 0.0), (1.0, 0.0), (1.0, 1.0)]), &pose, 0.5).unwrap();
        assert_eq!(request.interior, vec![Point2D::new(1.0, 0.0)]);
        assert_eq!(request.end.position(), Point2D::new(1.0, 1.0));
        assert_relative_eq!(request.end.yaw, FRAC_PI_2);
    }

    #[test]
    fn test_keeps_first_waypoint_when_far() {
        let pose = Pose2D::new(5.0, 5.0, 0.0);
        let request = trajectory_request(&path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]), &pose, 0.5).unwrap();
        assert_eq!(request.interior.len(), 2);
        assert_relative_eq!(request.end.yaw, 0.0);
    }

    #[test]
    fn test_single_point_path() {
        let pose = Pose2D::new(0.0, 0.0, 1.0);
        let request = trajectory_request(&path(&[(0.0, 0.0)]), &pose, 0.5).unwrap();
        assert!(request.interior.is_empty());
        assert_relative_eq!(request.end.yaw, 1.0);
        assert!(trajectory_request(&Path2D::new(), &pose, 0.5).is_none());
    }
}
