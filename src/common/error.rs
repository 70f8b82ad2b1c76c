//! Error types for informed_planner

use std::fmt;

/// Main error type for the planner
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Nearest-neighbour query on a tree without a root
    EmptyTree,
    /// Exploration budget exhausted without reaching the goal
    PathNotFound { budget: usize },
    /// No in-bounds sample could be drawn within the retry cap
    DegenerateField { attempts: usize },
    /// Invalid parameter
    InvalidParameter(String),
    /// Configuration could not be parsed
    Config(String),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::EmptyTree => write!(f, "Tree invariant violated: nearest query on an empty tree"),
            PlannerError::PathNotFound { budget } => {
                write!(f, "Path not found after {} exploration nodes", budget)
            }
            PlannerError::DegenerateField { attempts } => {
                write!(f, "Degenerate field: no in-bounds sample after {} attempts", attempts)
            }
            PlannerError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PlannerError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<serde_yaml::Error> for PlannerError {
    fn from(e: serde_yaml::Error) -> Self {
        PlannerError::Config(e.to_string())
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
