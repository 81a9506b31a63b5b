//! # Utilities Module
//!
//! Grid mathematics and pathfinding shared by the engines and renderers.

pub mod math;
pub mod pathfinding;

pub use math::*;
pub use pathfinding::*;
