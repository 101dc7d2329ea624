//! CVRP ACO Solver Library
//!
//! Solves the Capacitated Vehicle Routing Problem (CVRP) with an Ant Colony
//! System: capacity-limited ants build multi-trip routes from a depot, and
//! pheromone on the customer graph biases later construction toward short tours.
//!
//! # Features
//!
//! - Pseudo-random proportional selection (exploitation / roulette wheel)
//! - Capacity-constrained route construction with depot refills
//! - Iteration-batched pheromone update: local decay, then best-tour reinforcement
//! - Tolerant CSV customer loading
//! - Multi-seed benchmarking
//!
//! # Example
//!
//! ```no_run
//! use cvrp_aco::graph::{Coordinate, DistanceGraph};
//! use cvrp_aco::heuristics::aco::{ACOConfig, AntColony};
//! use cvrp_aco::instance::CustomerSource;
//!
//! let report = CustomerSource::default().load("customers.csv").unwrap();
//! let config = ACOConfig::default();
//! let graph = DistanceGraph::from_customers(
//!     Coordinate::new(0.0, 0.0),
//!     &report.customers,
//!     config.initial_pheromone,
//! ).unwrap();
//!
//! let mut colony = AntColony::new(graph, config).unwrap();
//! let solution = colony.run().unwrap();
//!
//! println!("Best tour length: {}", solution.length);
//! ```

pub mod error;
pub mod graph;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod benchmark;

pub use error::{AcoError, Result};
pub use graph::DistanceGraph;
pub use solution::Solution;
