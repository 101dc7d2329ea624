//! Heuristics module for the CVRP.
//!
//! This module exports the ant, the construction policy, and the colony loop.

pub mod ant;
pub mod construction;
pub mod aco;

pub use ant::*;
pub use construction::*;
pub use aco::*;
