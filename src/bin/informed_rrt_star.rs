// Informed RRT* planning with replanning on obstacle motion
//
// usage: informed_rrt_star [planner_config.yaml]

use informed_planner::path_planning::informed_rrt_star::{InformedRrtStar, PlannerConfig, WorkspaceEvent};
use informed_planner::utils::{Obstacle, RectangularField};
use informed_planner::{Path2D, PlannerError, Point2D, Pose2D, TrajectoryGenerator, TrajectoryRequest};
use log::{error, info};

/// Constant-speed profile standing in for the real trajectory generator
struct ConstantSpeedProfile {
    speed: f64,
}

impl TrajectoryGenerator for ConstantSpeedProfile {
    type Trajectory = Vec<(f64, Point2D)>;

    fn generate(&self, request: &TrajectoryRequest) -> Self::Trajectory {
        let mut t = 0.0;
        let mut last = request.start.position();
        let mut profile = vec![(t, last)];
        for point in request.interior.iter().chain(std::iter::once(&request.end.position())) {
            t += last.distance(point) / self.speed;
            profile.push((t, *point));
            last = *point;
        }
        profile
    }
}

fn load_config() -> Result<PlannerConfig, PlannerError> {
    match std::env::args().nth(1) {
        Some(file) => {
            let yaml = std::fs::read_to_string(&file)
                .map_err(|e| PlannerError::Config(format!("{}: {}", file, e)))?;
            PlannerConfig::from_yaml_str(&yaml)
        }
        None => Ok(PlannerConfig::default()),
    }
}

fn report(label: &str, path: &Path2D) {
    info!("{}: {} waypoints, length {:.3}", label, path.len(), path.total_length());
    for p in &path.points {
        info!("  ({:.3}, {:.3})", p.x, p.y);
    }
}

fn run() -> Result<(), PlannerError> {
    let config = load_config()?;
    let mut field = RectangularField::new(10.0, 10.0)?.with_obstacles(vec![
        Obstacle::circle(5.0, 5.0, 1.0),
        Obstacle::circle(3.0, 6.0, 1.0),
        Obstacle::circle(7.0, 5.0, 1.0),
        Obstacle::rectangle(1.0, 8.0, 4.0, 8.5),
    ]);

    let pose = Pose2D::new(0.5, 0.5, 0.0);
    let goal = Point2D::new(9.0, 9.0);

    let mut planner = InformedRrtStar::new(config)?;
    let path = planner.path_to(&field, goal, &pose)?;
    report("initial path", &path);

    if let Some(request) = planner.trajectory_request(&pose) {
        let profile = ConstantSpeedProfile { speed: 1.5 }.generate(&request);
        if let Some((t, _)) = profile.last() {
            info!("trajectory duration {:.2} s over {} points", t, profile.len());
        }
    }

    // drop an obstacle onto the second waypoint
    if let Some(&blocked) = path.points.get(1) {
        let id = field.add_obstacle(Obstacle::circle(blocked.x, blocked.y, 0.2));
        info!("obstacle {} placed at ({:.2}, {:.2})", id, blocked.x, blocked.y);
    }
    let event = WorkspaceEvent::ObstaclesMoved { vehicle_position: pose.position() };
    let updated = planner.update_path(&field, &path, event)?;
    report("updated path", &updated);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Informed RRT* path planning start!!");
    if let Err(e) = run() {
        error!("Planning failed: {}", e);
    }
    info!("Informed RRT* path planning finish!!");
}
