//! Capacity-bounded ant.
//!
//! An ant only records where it went; whether a move is feasible is decided by
//! the colony before the move is recorded.

use crate::graph::{EdgeKey, NodeId};
use serde::{Deserialize, Serialize};

/// A directed move between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Edge { from, to }
    }

    /// Undirected key used for pheromone lookups
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }
}

#[derive(Debug, Clone)]
pub struct Ant {
    id: usize,
    capacity: u32,
    max_capacity: u32,
    position: NodeId,
    route: Vec<Edge>,
}

impl Ant {
    pub fn new(id: usize, max_capacity: u32) -> Self {
        Ant {
            id,
            capacity: max_capacity,
            max_capacity,
            position: NodeId::Depot,
            route: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn reset_capacity(&mut self) {
        self.capacity = self.max_capacity;
    }

    /// Back to the start of an iteration: full, at the depot, empty route
    pub fn reset(&mut self) {
        self.reset_capacity();
        self.position = NodeId::Depot;
        self.route.clear();
    }

    pub fn current_position(&self) -> NodeId {
        self.position
    }

    /// Append (current, next) to the route and move to `next`
    pub fn record_move(&mut self, next: NodeId) {
        self.route.push(Edge::new(self.position, next));
        self.position = next;
    }

    /// Take `demand` out of the remaining capacity
    pub fn serve(&mut self, demand: u32) {
        self.capacity = self.capacity.saturating_sub(demand);
    }

    pub fn route(&self) -> &[Edge] {
        &self.route
    }
}
