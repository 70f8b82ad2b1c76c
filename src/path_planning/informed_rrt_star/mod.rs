//! Informed RRT* path planning with dynamic replanning
//!
//! A sampling-based planner that grows a tree from the vehicle position,
//! rewires it toward shorter paths, and once a path exists focuses further
//! samples inside the ellipse that could still improve it. When the
//! workspace changes, blocked subtrees are pruned and the planner replans
//! only if the current path was lost.

pub mod config;
pub mod informed_region;
pub mod node;
pub mod planner;
pub mod tree;
pub mod waypoints;

pub use config::PlannerConfig;
pub use informed_region::InformedRegion;
pub use node::{Node, NodeId};
pub use planner::{FieldPlanner, InformedRrtStar, PlannerState, WorkspaceEvent};
pub use tree::{NodeRemap, Tree};
pub use waypoints::trajectory_request;
