//! Informed RRT* planning session
//!
//! Grows a tree from the vehicle position with uniform samples until the
//! goal is reached, then spends a small extra budget sampling inside the
//! informed ellipse to shorten the path. When obstacles move, invalidated
//! subtrees are pruned and the session replans only if the path was lost.

use std::f64::consts::PI;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

use super::config::PlannerConfig;
use super::informed_region::InformedRegion;
use super::node::NodeId;
use super::tree::{edge_in_field, Tree};
use super::waypoints::trajectory_request;
use crate::common::{
    FieldBounds, Path2D, PathPlanner, PlannerError, PlannerResult, Point2D, PoseSource,
    TrajectoryRequest,
};

/// Where a session is in its planning cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    Idle,
    Exploring,
    Optimizing,
    Done,
    Blocked,
    Replanning,
}

/// Notification that the workspace changed under a planned path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkspaceEvent {
    ObstaclesMoved { vehicle_position: Point2D },
}

/// A single planning session owning its tree and informed region.
///
/// Sessions are not reentrant; the field oracle is borrowed for the
/// duration of each call so that the caller can mutate it in between.
#[derive(Debug)]
pub struct InformedRrtStar {
    config: PlannerConfig,
    tree: Tree,
    region: InformedRegion,
    rng: StdRng,
    unit: Uniform<f64>,
    state: PlannerState,
    path_found: bool,
    end_node: Option<NodeId>,
    goal: Option<Point2D>,
    goal_connected: bool,
}

impl InformedRrtStar {
    pub fn new(config: PlannerConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(InformedRrtStar {
            tree: Tree::new(config.max_branch_length, config.rewire_radius()),
            region: InformedRegion::new(Point2D::origin(), Point2D::origin()),
            rng: StdRng::seed_from_u64(config.seed),
            unit: Uniform::new(0.0, 1.0),
            state: PlannerState::Idle,
            path_found: false,
            end_node: None,
            goal: None,
            goal_connected: false,
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn informed_region(&self) -> &InformedRegion {
        &self.region
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn path_found(&self) -> bool {
        self.path_found
    }

    pub fn end_node(&self) -> Option<NodeId> {
        self.end_node
    }

    pub fn goal(&self) -> Option<Point2D> {
        self.goal
    }

    /// Current root-to-goal waypoints, if a path is known.
    ///
    /// The goal itself is appended when it is free and within one branch
    /// of the end node.
    pub fn path(&self) -> Option<Path2D> {
        let mut path = self.tree.trace_path(self.end_node?);
        if self.goal_connected {
            if let Some(goal) = self.goal {
                path.push(goal);
            }
        }
        Some(path)
    }

    /// Estimated start-to-goal length: cost to the end node plus the
    /// remaining straight segment to the goal.
    pub fn path_cost(&self) -> Option<f64> {
        let node = self.tree.get(self.end_node?)?;
        let residual = self.goal.map_or(0.0, |g| node.position().distance(&g));
        Some(node.path_length_from_root() + residual)
    }

    /// Plan from `start` to `goal`, discarding any previous tree.
    pub fn plan_path<F>(&mut self, field: &F, start: Point2D, goal: Point2D) -> PlannerResult<Path2D>
    where
        F: FieldBounds + ?Sized,
    {
        self.path_found = false;
        self.end_node = None;
        self.goal = Some(goal);
        self.goal_connected = false;
        self.tree.reset(start);
        self.region.setup(start, goal);

        self.state = PlannerState::Exploring;
        let budget = self.config.exploration_depth;
        for iteration in self.tree.node_count()..budget {
            if self.path_found {
                break;
            }
            if iteration % 100 == 0 {
                debug!("Iter: {}, number of nodes: {}", iteration, self.tree.node_count());
            }
            let sample = self.uniform_sample(field)?;
            self.extend(field, sample, false)?;
        }

        if !self.path_found {
            self.state = PlannerState::Done;
            warn!(
                "no path from ({:.2}, {:.2}) to ({:.2}, {:.2}) within {} nodes",
                start.x, start.y, goal.x, goal.y, budget
            );
            return Err(PlannerError::PathNotFound { budget });
        }

        if self.config.prune_informed {
            self.prune_informed();
        }
        let informed = self.tree.informed_count();
        self.optimize_phase(field, self.config.optimization_depth.saturating_sub(informed))?;
        self.current_path()
    }

    /// Spend `budget` more informed samples on the current path.
    ///
    /// The path cost never increases.
    pub fn refine<F>(&mut self, field: &F, budget: usize) -> PlannerResult<Path2D>
    where
        F: FieldBounds + ?Sized,
    {
        self.current_path()?;
        self.optimize_phase(field, budget)?;
        self.current_path()
    }

    /// Plan from the vehicle's current position to `goal`.
    pub fn path_to<F, P>(&mut self, field: &F, goal: Point2D, pose: &P) -> PlannerResult<Path2D>
    where
        F: FieldBounds + ?Sized,
        P: PoseSource + ?Sized,
    {
        self.plan_path(field, pose.position(), goal)
    }

    /// React to a workspace change.
    ///
    /// Returns `previous` untouched when the current path survives pruning
    /// and every waypoint is still free. If only the goal waypoint became
    /// blocked, the re-traced path ending at the end node is returned.
    /// Otherwise replans from the vehicle position to the tail of `previous`.
    pub fn update_path<F>(
        &mut self,
        field: &F,
        previous: &Path2D,
        event: WorkspaceEvent,
    ) -> PlannerResult<Path2D>
    where
        F: FieldBounds + ?Sized,
    {
        let WorkspaceEvent::ObstaclesMoved { vehicle_position } = event;
        self.state = PlannerState::Blocked;

        let remap = self.tree.prune_blocked(field, self.config.edge_check_resolution);
        self.end_node = self.end_node.and_then(|id| remap.get(id));
        let was_connected = self.goal_connected;
        let end_position = self.end_node.and_then(|id| self.tree.get(id)).map(|n| n.position());
        if let Some(end) = end_position {
            self.goal_connected = self.goal_connected && self.goal_connects(field, &end);
        }
        if self.end_node.is_some() && self.path_found {
            debug!("path survived workspace change ({} nodes pruned)", remap.removed());
            self.state = PlannerState::Done;
            let intact = was_connected == self.goal_connected
                && previous.points.iter().all(|p| field.in_field(p));
            if intact {
                return Ok(previous.clone());
            }
            debug!("previous waypoints blocked, returning re-traced path");
            return self.current_path();
        }
        self.path_found = false;

        let goal = previous
            .last()
            .copied()
            .or(self.goal)
            .ok_or_else(|| PlannerError::InvalidParameter("no previous path to replan".to_string()))?;
        info!(
            "path blocked, replanning from ({:.2}, {:.2}) to ({:.2}, {:.2})",
            vehicle_position.x, vehicle_position.y, goal.x, goal.y
        );
        self.state = PlannerState::Replanning;
        self.plan_path(field, vehicle_position, goal)
    }

    /// Waypoints of the current path packaged for a trajectory generator
    pub fn trajectory_request<P>(&self, pose: &P) -> Option<TrajectoryRequest>
    where
        P: PoseSource + ?Sized,
    {
        let path = self.path()?;
        trajectory_request(&path, &pose.pose(), self.config.min_goal_distance)
    }

    /// Drop nodes outside the informed ellipse, keeping the current path.
    pub fn prune_informed(&mut self) {
        if !self.path_found {
            return;
        }
        let remap = self.tree.prune_informed(&self.region, self.end_node);
        self.end_node = self.end_node.and_then(|id| remap.get(id));
    }

    fn current_path(&self) -> PlannerResult<Path2D> {
        self.path().ok_or(PlannerError::PathNotFound {
            budget: self.config.exploration_depth,
        })
    }

    fn optimize_phase<F>(&mut self, field: &F, budget: usize) -> PlannerResult<()>
    where
        F: FieldBounds + ?Sized,
    {
        self.state = PlannerState::Optimizing;
        for _ in 0..budget {
            let sample = self.informed_sample();
            self.extend(field, sample, true)?;
        }
        self.state = PlannerState::Done;
        Ok(())
    }

    /// Uniform in-field sample with bounded rejection.
    fn uniform_sample<F>(&mut self, field: &F) -> PlannerResult<Point2D>
    where
        F: FieldBounds + ?Sized,
    {
        let attempts = self.config.max_sample_attempts;
        let (width, height) = field.bounds();
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(PlannerError::DegenerateField { attempts: 0 });
        }
        let xs = Uniform::new(0.0, width);
        let ys = Uniform::new(0.0, height);
        for _ in 0..attempts {
            let point = Point2D::new(xs.sample(&mut self.rng), ys.sample(&mut self.rng));
            if field.in_field(&point) {
                return Ok(point);
            }
        }
        Err(PlannerError::DegenerateField { attempts })
    }

    /// Sample uniformly by area inside the informed ellipse.
    fn informed_sample(&mut self) -> Point2D {
        let rho = self.unit.sample(&mut self.rng).sqrt();
        let theta = self.unit.sample(&mut self.rng) * 2.0 * PI;
        self.region.sample(rho, theta)
    }

    /// Steer toward `sample`, insert, rewire and test the goal.
    fn extend<F>(&mut self, field: &F, sample: Point2D, informed: bool) -> PlannerResult<Option<NodeId>>
    where
        F: FieldBounds + ?Sized,
    {
        let nearest = self.tree.nearest_node(&sample)?;
        let from = self.tree.get(nearest).ok_or(PlannerError::EmptyTree)?.position();
        let new = match self.steer(&from, &sample) {
            Some(p) => p,
            None => return Ok(None),
        };
        let resolution = self.config.edge_check_resolution;
        if !field.in_field(&new) || !edge_in_field(field, &from, &new, resolution) {
            return Ok(None);
        }

        let id = self.tree.add_node(new, nearest, informed);
        self.tree
            .optimize_with(id, |a, b| edge_in_field(field, a, b, resolution));
        self.check_goal(field, id);
        Ok(Some(id))
    }

    fn steer(&self, from: &Point2D, to: &Point2D) -> Option<Point2D> {
        let delta = to.to_vector() - from.to_vector();
        let magnitude = delta.norm();
        if magnitude <= f64::EPSILON {
            return None;
        }
        let delta = if magnitude > self.config.max_branch_length {
            delta * (self.config.max_branch_length / magnitude)
        } else {
            delta
        };
        Some(Point2D::from(from.to_vector() + delta))
    }

    /// Accept `id` as the end node if it reaches the goal more cheaply.
    ///
    /// Candidates are ranked by estimated total length; the first found
    /// wins ties.
    fn check_goal<F>(&mut self, field: &F, id: NodeId)
    where
        F: FieldBounds + ?Sized,
    {
        let goal = match self.goal {
            Some(g) => g,
            None => return,
        };
        let (position, cost) = match self.tree.get(id) {
            Some(n) => (n.position(), n.path_length_from_root()),
            None => return,
        };
        let end_dis = position.distance(&goal);
        if end_dis >= self.config.min_goal_distance {
            return;
        }
        let total = cost + end_dis;
        let improves = match self.path_cost() {
            Some(best) => total < best,
            None => true,
        };
        if !self.path_found || improves {
            self.path_found = true;
            self.end_node = Some(id);
            self.goal_connected = self.goal_connects(field, &position);
            self.region.update(total);
            info!("path found with length {:.3} ({} nodes)", total, self.tree.node_count());
        }
    }

    /// Whether the goal can be appended after `end` as a final waypoint.
    fn goal_connects<F>(&self, field: &F, end: &Point2D) -> bool
    where
        F: FieldBounds + ?Sized,
    {
        let goal = match self.goal {
            Some(g) => g,
            None => return false,
        };
        let d = end.distance(&goal);
        d > 0.0
            && d <= self.config.max_branch_length
            && field.in_field(&goal)
            && edge_in_field(field, end, &goal, self.config.edge_check_resolution)
    }
}

/// One-shot planner over an owned field, running a fresh session per call
#[derive(Debug, Clone)]
pub struct FieldPlanner<F> {
    pub config: PlannerConfig,
    pub field: F,
}

impl<F: FieldBounds> FieldPlanner<F> {
    pub fn new(config: PlannerConfig, field: F) -> Self {
        FieldPlanner { config, field }
    }
}

impl<F: FieldBounds> PathPlanner for FieldPlanner<F> {
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<Path2D, PlannerError> {
        let mut session = InformedRrtStar::new(self.config.clone())?;
        session.plan_path(&self.field, start, goal)
    }
}
