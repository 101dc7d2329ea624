//! Weighted customer graph for the CVRP.
//!
//! The graph holds the depot and every customer with its coordinate and demand,
//! and one pheromone value per unordered pair of distinct nodes. Distances are
//! Euclidean, truncated toward zero to an integer.

use crate::error::{AcoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A point in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Coordinate { x, y }
    }
}

/// Euclidean distance between two coordinates, truncated toward zero.
///
/// `distance((1,2), (5,5))` is 5.
#[inline]
pub fn distance(c1: Coordinate, c2: Coordinate) -> u64 {
    let dx = c2.x - c1.x;
    let dy = c2.y - c1.y;
    (dx * dx + dy * dy).sqrt() as u64
}

/// Node identifier. The depot is a sentinel that never collides with a customer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeId {
    Depot,
    Customer(u32),
}

impl NodeId {
    pub fn is_depot(&self) -> bool {
        matches!(self, NodeId::Depot)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Depot => write!(f, "depot"),
            NodeId::Customer(id) => write!(f, "{}", id),
        }
    }
}

/// One customer as read from the data source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: u32,
    pub coord: Coordinate,
    pub demand: u32,
}

impl CustomerRecord {
    pub fn new(id: u32, x: f64, y: f64, demand: u32) -> Self {
        CustomerRecord { id, coord: Coordinate::new(x, y), demand }
    }
}

/// Per-node attributes stored in the graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub coord: Coordinate,
    pub demand: u32,
}

/// Unordered pair of distinct nodes. `EdgeKey::new(a, b) == EdgeKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    pub fn new(u: NodeId, v: NodeId) -> Self {
        if u <= v {
            EdgeKey(u, v)
        } else {
            EdgeKey(v, u)
        }
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }
}

/// Complete graph over the depot and all customers, with pheromone per edge
#[derive(Debug, Clone)]
pub struct DistanceGraph {
    nodes: BTreeMap<NodeId, NodeAttributes>,
    pheromone: BTreeMap<EdgeKey, f64>,
    initial_pheromone: f64,
}

impl DistanceGraph {
    /// Create a graph holding only the depot
    pub fn new(depot: Coordinate, initial_pheromone: f64) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::Depot, NodeAttributes { coord: depot, demand: 0 });

        DistanceGraph {
            nodes,
            pheromone: BTreeMap::new(),
            initial_pheromone,
        }
    }

    /// Build the graph from a customer list plus the depot.
    /// Every pair of distinct nodes is seeded with `initial_pheromone`.
    pub fn from_customers(
        depot: Coordinate,
        customers: &[CustomerRecord],
        initial_pheromone: f64,
    ) -> Result<Self> {
        let mut graph = DistanceGraph::new(depot, initial_pheromone);
        for record in customers {
            graph.add_customer(*record)?;
        }
        Ok(graph)
    }

    /// Insert a customer and connect it to every existing node
    pub fn add_customer(&mut self, record: CustomerRecord) -> Result<()> {
        let id = NodeId::Customer(record.id);
        if self.nodes.contains_key(&id) {
            return Err(AcoError::DuplicateNode(id));
        }

        for &other in self.nodes.keys() {
            self.pheromone.insert(EdgeKey::new(id, other), self.initial_pheromone);
        }
        self.nodes.insert(id, NodeAttributes { coord: record.coord, demand: record.demand });

        Ok(())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn coord(&self, node: NodeId) -> Result<Coordinate> {
        self.nodes
            .get(&node)
            .map(|attrs| attrs.coord)
            .ok_or_else(|| AcoError::missing(node, "coord"))
    }

    pub fn demand(&self, node: NodeId) -> Result<u32> {
        self.nodes
            .get(&node)
            .map(|attrs| attrs.demand)
            .ok_or_else(|| AcoError::missing(node, "demand"))
    }

    pub fn depot(&self) -> Coordinate {
        // the depot is inserted by every constructor
        self.nodes[&NodeId::Depot].coord
    }

    /// Truncated Euclidean distance between two nodes of the graph
    pub fn node_distance(&self, u: NodeId, v: NodeId) -> Result<u64> {
        Ok(distance(self.coord(u)?, self.coord(v)?))
    }

    /// Pheromone on the edge u-v (symmetric)
    pub fn pheromone(&self, u: NodeId, v: NodeId) -> Result<f64> {
        self.pheromone
            .get(&EdgeKey::new(u, v))
            .copied()
            .ok_or_else(|| self.missing_edge(u, v))
    }

    /// Overwrite the pheromone on the edge u-v (symmetric)
    pub fn set_pheromone(&mut self, u: NodeId, v: NodeId, value: f64) -> Result<()> {
        let missing = self.missing_edge(u, v);
        match self.pheromone.get_mut(&EdgeKey::new(u, v)) {
            Some(tau) => {
                *tau = value;
                Ok(())
            }
            None => Err(missing),
        }
    }

    fn missing_edge(&self, u: NodeId, v: NodeId) -> AcoError {
        let node = if self.contains(u) { v } else { u };
        AcoError::missing(node, "pheromone")
    }

    /// Apply `f` to the pheromone of every edge in the graph
    pub fn update_all_pheromone<F: FnMut(f64) -> f64>(&mut self, mut f: F) {
        for tau in self.pheromone.values_mut() {
            *tau = f(*tau);
        }
    }

    /// All edges with their current pheromone, in key order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, f64)> + '_ {
        self.pheromone.iter().map(|(k, &v)| (*k, v))
    }

    /// Customer ids in ascending order (depot excluded)
    pub fn customer_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied().filter(|n| !n.is_depot())
    }

    pub fn customers(&self) -> impl Iterator<Item = (NodeId, &NodeAttributes)> + '_ {
        self.nodes.iter().filter(|(id, _)| !id.is_depot()).map(|(id, a)| (*id, a))
    }

    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.pheromone.len()
    }

    pub fn total_demand(&self) -> u64 {
        self.nodes.values().map(|a| a.demand as u64).sum()
    }
}
