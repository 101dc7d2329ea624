//! Next-customer selection rule for route construction.
//!
//! Implements the Ant Colony System pseudo-random proportional rule: with
//! probability `q0` the ant exploits the most desirable edge, otherwise it
//! explores with a roulette wheel over all feasible candidates. The policy
//! only reads the graph; it never mutates ants or pheromone.

use crate::error::{AcoError, Result};
use crate::graph::{DistanceGraph, NodeId};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Heuristic value used when two distinct nodes are less than one unit apart
pub const ZERO_DISTANCE_HEURISTIC: f64 = 1e6;

/// How often the exploitation draw `q` is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawGranularity {
    /// One draw per decision, taken before scanning candidates
    #[default]
    PerDecision,
    /// One draw per scanned candidate. Candidates whose draw falls below `q0`
    /// compete on score; if none does, the decision uses the roulette wheel.
    PerCandidate,
}

/// Selection rule parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructionPolicy {
    /// Pheromone exponent
    pub alpha: f64,
    /// Inverse-distance exponent
    pub beta: f64,
    /// Exploitation probability
    pub q0: f64,
    pub draw: DrawGranularity,
}

impl ConstructionPolicy {
    pub fn new(alpha: f64, beta: f64, q0: f64) -> Self {
        ConstructionPolicy {
            alpha,
            beta,
            q0,
            draw: DrawGranularity::PerDecision,
        }
    }

    pub fn with_draw(mut self, draw: DrawGranularity) -> Self {
        self.draw = draw;
        self
    }

    /// Desirability of moving from `from` to `to`: tau^alpha * (1/d)^beta
    pub fn score(&self, graph: &DistanceGraph, from: NodeId, to: NodeId) -> Result<f64> {
        let tau = graph.pheromone(from, to)?;
        let dist = graph.node_distance(from, to)?;
        let eta = if dist > 0 {
            1.0 / dist as f64
        } else {
            ZERO_DISTANCE_HEURISTIC
        };

        Ok(tau.powf(self.alpha) * eta.powf(self.beta))
    }

    pub fn scores(
        &self,
        graph: &DistanceGraph,
        from: NodeId,
        candidates: &[NodeId],
    ) -> Result<Vec<f64>> {
        candidates
            .iter()
            .map(|&c| self.score(graph, from, c))
            .collect()
    }

    /// Choose the next customer among `candidates` (scanned in the given order).
    ///
    /// Fails with `Selection` when `candidates` is empty.
    pub fn select<R: Rng>(
        &self,
        graph: &DistanceGraph,
        from: NodeId,
        candidates: &[NodeId],
        rng: &mut R,
    ) -> Result<NodeId> {
        if candidates.is_empty() {
            return Err(AcoError::Selection(format!(
                "no feasible customer reachable from {}",
                from
            )));
        }

        let scores = self.scores(graph, from, candidates)?;

        let index = match self.draw {
            DrawGranularity::PerDecision => {
                let q: f64 = rng.gen();
                if q < self.q0 {
                    exploit_select(&scores)
                } else {
                    roulette_select(&scores, rng.gen())
                }
            }
            DrawGranularity::PerCandidate => {
                let mut best: Option<usize> = None;
                for (i, &s) in scores.iter().enumerate() {
                    let q: f64 = rng.gen();
                    if q < self.q0 && best.map_or(true, |b| s > scores[b]) {
                        best = Some(i);
                    }
                }
                best.or_else(|| roulette_select(&scores, rng.gen()))
            }
        };

        let chosen = index
            .map(|i| candidates[i])
            .ok_or_else(|| AcoError::Selection(format!("no candidate selected from {}", from)))?;

        log::trace!("ant at {} picked {} among {} candidates", from, chosen, candidates.len());
        Ok(chosen)
    }
}

/// Index of the highest score; ties go to the first one encountered
pub fn exploit_select(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &s) in scores.iter().enumerate() {
        if best.map_or(true, |b| s > scores[b]) {
            best = Some(i);
        }
    }
    best
}

/// Roulette wheel over `scores` for a draw `r` in [0, 1).
///
/// Returns the first index whose cumulative normalized score exceeds `r`.
/// A wheel with zero total weight degrades to a uniform pick.
pub fn roulette_select(scores: &[f64], r: f64) -> Option<usize> {
    let n = scores.len();
    if n == 0 {
        return None;
    }

    let total: f64 = scores.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        log::warn!("roulette wheel has total weight {}, picking uniformly", total);
        return Some(((r * n as f64) as usize).min(n - 1));
    }

    let mut cumulative = 0.0;
    for (i, &s) in scores.iter().enumerate() {
        cumulative += s / total;
        if r < cumulative {
            return Some(i);
        }
    }

    // r landed above the last boundary through rounding
    Some(n - 1)
}
