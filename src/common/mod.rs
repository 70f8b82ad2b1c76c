//! Common types, traits, and error definitions for informed_planner
//!
//! This module provides the geometry and the narrow interfaces through
//! which the planner talks to the rest of the vehicle software.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
