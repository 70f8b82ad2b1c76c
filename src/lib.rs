//! informed_planner - sampling-based motion planning for a mobile vehicle
//!
//! This crate plans collision-free paths inside a bounded, partially
//! dynamic workspace with Informed RRT*, and replans incrementally when
//! obstacles move.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, Pose2D, Path2D, TrajectoryRequest};
pub use common::{FieldBounds, PoseSource, TrajectoryGenerator, PathPlanner};
pub use common::{PlannerError, PlannerResult};
pub use path_planning::informed_rrt_star::{InformedRrtStar, PlannerConfig, WorkspaceEvent};
