//! Utility modules for informed_planner

pub mod field;

pub use field::{Obstacle, RectangularField};
