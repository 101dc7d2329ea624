//! Solution representation for the CVRP.
//!
//! A solution is the route of the best ant: a node sequence starting and ending
//! at the depot, split into depot-to-depot trips.

use crate::error::Result;
use crate::graph::{distance, DistanceGraph, NodeId};
use crate::heuristics::ant::Edge;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;

/// One depot-to-depot trip of a vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Customers served in visiting order
    pub customers: Vec<NodeId>,
    /// Total demand served
    pub load: u64,
    /// Length including the legs from and to the depot
    pub length: u64,
}

/// Represents a solution to the CVRP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Full node sequence, depot first and last
    pub tour: Vec<NodeId>,
    pub trips: Vec<Trip>,
    /// Total tour length
    pub length: u64,
    /// Whether every trip fits the capacity and every customer is served exactly once
    pub feasible: bool,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations run
    pub iterations: usize,
    /// Best length after each iteration
    pub history: Vec<u64>,
}

impl Solution {
    /// Build a solution from an ant route and validate it against `capacity`
    pub fn from_route(graph: &DistanceGraph, route: &[Edge], capacity: u32) -> Result<Self> {
        let mut tour = Vec::with_capacity(route.len() + 1);
        if let Some(first) = route.first() {
            tour.push(first.from);
        }

        let mut trips = Vec::new();
        let mut current = Trip {
            customers: Vec::new(),
            load: 0,
            length: 0,
        };
        let mut length = 0;

        for edge in route {
            let leg = distance(graph.coord(edge.from)?, graph.coord(edge.to)?);
            length += leg;
            current.length += leg;
            tour.push(edge.to);

            if edge.to.is_depot() {
                trips.push(std::mem::replace(
                    &mut current,
                    Trip {
                        customers: Vec::new(),
                        load: 0,
                        length: 0,
                    },
                ));
            } else {
                current.load += graph.demand(edge.to)? as u64;
                current.customers.push(edge.to);
            }
        }

        let mut solution = Solution {
            tour,
            trips,
            length,
            feasible: false,
            algorithm: "ACO".to_string(),
            computation_time: 0.0,
            iterations: 0,
            history: Vec::new(),
        };
        solution.feasible = solution.is_feasible(graph, capacity);
        Ok(solution)
    }

    /// Capacity, coverage, and depot start/end checks
    pub fn is_feasible(&self, graph: &DistanceGraph, capacity: u32) -> bool {
        if self.tour.first() != Some(&NodeId::Depot) || self.tour.last() != Some(&NodeId::Depot) {
            return false;
        }
        if self.trips.iter().any(|t| t.load > capacity as u64) {
            return false;
        }
        self.is_complete(graph)
    }

    /// Check that every customer is visited exactly once
    pub fn is_complete(&self, graph: &DistanceGraph) -> bool {
        let served: Vec<NodeId> = self.trips.iter().flat_map(|t| t.customers.iter().copied()).collect();
        let unique: HashSet<NodeId> = served.iter().copied().collect();

        served.len() == graph.num_customers()
            && unique.len() == served.len()
            && graph.customer_ids().all(|c| unique.contains(&c))
    }

    pub fn num_trips(&self) -> usize {
        self.trips.len()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Length: {}", self.length)?;
        writeln!(f, "  Feasible: {}", self.feasible)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        for (i, trip) in self.trips.iter().enumerate() {
            let stops: Vec<String> = trip.customers.iter().map(|c| c.to_string()).collect();
            writeln!(
                f,
                "  Trip {}: depot -> {} -> depot (load {}, length {})",
                i + 1,
                stops.join(" -> "),
                trip.load,
                trip.length
            )?;
        }
        Ok(())
    }
}

/// Summary record of one full run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub iterations: usize,
    pub alpha: f64,
    pub beta: f64,
    pub customer_count: usize,
    pub q0: f64,
    /// `None` until at least one iteration has completed
    pub best_tour_length: Option<u64>,
}

impl RunSummary {
    /// Append this record as a CSV row, writing the header only for a new file
    pub fn append_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);

        writer.serialize(self)?;
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Alpha: {}", self.alpha)?;
        writeln!(f, "Beta: {}", self.beta)?;
        writeln!(f, "Customers: {}", self.customer_count)?;
        writeln!(f, "q0: {}", self.q0)?;
        match self.best_tour_length {
            Some(length) => writeln!(f, "Best tour length: {}", length),
            None => writeln!(f, "Best tour length: -"),
        }
    }
}
