//! Configuration for the Informed RRT* planner

use serde::{Deserialize, Serialize};

use crate::common::{PlannerError, PlannerResult};

/// Configuration for Informed RRT* planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum steer length per new node [m]
    pub max_branch_length: f64,
    /// Node budget for the exploration phase
    pub exploration_depth: usize,
    /// Node budget for the optimization phase
    pub optimization_depth: usize,
    /// Goal tolerance [m]
    pub min_goal_distance: f64,
    /// Rewiring radius; defaults to `max_branch_length`
    pub neighborhood_radius: Option<f64>,
    /// Step for sampling the field along new edges; endpoint only when unset.
    ///
    /// With the default `None` only node positions are tested, so an
    /// obstacle that crosses an edge without covering either endpoint goes
    /// unnoticed, both while growing and when pruning after a workspace
    /// change.
    pub edge_check_resolution: Option<f64>,
    /// Retry cap for drawing an in-bounds uniform sample
    pub max_sample_attempts: usize,
    /// Drop nodes outside the informed ellipse before optimizing
    pub prune_informed: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_branch_length: 1.0,
            exploration_depth: 5000,
            optimization_depth: 100,
            min_goal_distance: 0.5,
            neighborhood_radius: None,
            edge_check_resolution: None,
            max_sample_attempts: 10_000,
            prune_informed: true,
            seed: 4,
        }
    }
}

impl PlannerConfig {
    pub fn from_yaml_str(yaml: &str) -> PlannerResult<Self> {
        let config: PlannerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> PlannerResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Effective rewiring radius, never longer than a branch.
    pub fn rewire_radius(&self) -> f64 {
        self.neighborhood_radius
            .unwrap_or(self.max_branch_length)
            .min(self.max_branch_length)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        positive("max_branch_length", self.max_branch_length)?;
        positive("min_goal_distance", self.min_goal_distance)?;
        if let Some(r) = self.neighborhood_radius {
            positive("neighborhood_radius", r)?;
        }
        if let Some(step) = self.edge_check_resolution {
            positive("edge_check_resolution", step)?;
        }
        if self.max_sample_attempts == 0 {
            return Err(PlannerError::InvalidParameter(
                "max_sample_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> PlannerResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PlannerError::InvalidParameter(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_branch_length, 1.0);
        assert_eq!(config.exploration_depth, 5000);
        assert_eq!(config.optimization_depth, 100);
        assert_eq!(config.min_goal_distance, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rewire_radius_clamped() {
        let config = PlannerConfig {
            neighborhood_radius: Some(3.0),
            ..Default::default()
        };
        assert_eq!(config.rewire_radius(), 1.0);

        let config = PlannerConfig {
            neighborhood_radius: Some(0.4),
            ..Default::default()
        };
        assert_eq!(config.rewire_radius(), 0.4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PlannerConfig {
            max_branch_length: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PlannerError::InvalidParameter(_))));

        let config = PlannerConfig {
            max_sample_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = PlannerConfig::from_yaml_str("max_branch_length: 0.25\nseed: 17\n").unwrap();
        assert_eq!(config.max_branch_length, 0.25);
        assert_eq!(config.seed, 17);
        assert_eq!(config.exploration_depth, 5000);

        let round = PlannerConfig::from_yaml_str(&config.to_yaml_string().unwrap()).unwrap();
        assert_eq!(round, config);
    }

    #[test]
    fn test_yaml_invalid_value() {
        assert!(PlannerConfig::from_yaml_str("min_goal_distance: -1.0").is_err());
    }
}
