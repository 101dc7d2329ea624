//! Ant Colony Optimization for the CVRP.
//!
//! Each iteration every ant builds a complete multi-trip route that serves all
//! customers, returning to the depot whenever no remaining customer fits in its
//! remaining capacity. Pheromone is updated once per iteration, after all ants
//! have finished: local decay on every edge, then reinforcement along the
//! iteration-best route.

use crate::error::{AcoError, Result};
use crate::graph::{DistanceGraph, EdgeKey, NodeId};
use crate::heuristics::ant::{Ant, Edge};
use crate::heuristics::construction::{ConstructionPolicy, DrawGranularity};
use crate::solution::{RunSummary, Solution};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Target value used when reinforcing edges of the iteration-best route
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum Reinforcement {
    /// Blend toward the raw best tour length (longer tours deposit more)
    #[default]
    TourLength,
    /// Blend toward `q / best tour length`
    InverseLength { q: f64 },
}

impl Reinforcement {
    pub fn deposit(&self, best_length: u64) -> f64 {
        match *self {
            Reinforcement::TourLength => best_length as f64,
            Reinforcement::InverseLength { q } => {
                if best_length == 0 {
                    q
                } else {
                    q / best_length as f64
                }
            }
        }
    }
}

/// ACO configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ACOConfig {
    /// Number of ants
    pub num_ants: usize,
    /// Number of iterations
    pub iterations: usize,
    /// Pheromone exponent; also the decay rate unless `evaporation` is set
    pub alpha: f64,
    /// Inverse-distance exponent
    pub beta: f64,
    /// Exploitation probability
    pub q0: f64,
    /// Maximum load of each ant
    pub vehicle_capacity: u32,
    /// Pheromone seeded on every edge at graph build time
    pub initial_pheromone: f64,
    /// Baseline the local decay blends toward
    pub constant_reinforcement: f64,
    /// Separate decay rate; `None` reuses `alpha`
    pub evaporation: Option<f64>,
    pub reinforcement: Reinforcement,
    pub draw: DrawGranularity,
    /// Random seed
    pub seed: u64,
}

impl Default for ACOConfig {
    fn default() -> Self {
        ACOConfig {
            num_ants: 5,
            iterations: 100,
            alpha: 1.0,
            beta: 0.1,
            q0: 0.9,
            vehicle_capacity: 50,
            initial_pheromone: 5.0,
            constant_reinforcement: 5.0,
            evaporation: None,
            reinforcement: Reinforcement::TourLength,
            draw: DrawGranularity::PerDecision,
            seed: 42,
        }
    }
}

impl ACOConfig {
    /// Read a configuration from JSON; missing fields take their default
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ACOConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Rate used by both the decay and the reinforcement blend
    pub fn decay_rate(&self) -> f64 {
        self.evaporation.unwrap_or(self.alpha)
    }

    pub fn policy(&self) -> ConstructionPolicy {
        ConstructionPolicy::new(self.alpha, self.beta, self.q0).with_draw(self.draw)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(AcoError::InvalidConfig(msg));

        if self.num_ants == 0 {
            return fail("num_ants must be at least 1".into());
        }
        if self.iterations == 0 {
            return fail("iterations must be at least 1".into());
        }
        if self.vehicle_capacity == 0 {
            return fail("vehicle_capacity must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.q0) {
            return fail(format!("q0 must lie in [0, 1], got {}", self.q0));
        }
        let rate = self.decay_rate();
        if !(0.0..=1.0).contains(&rate) {
            return fail(format!("decay rate must lie in [0, 1], got {}", rate));
        }
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return fail("alpha and beta must be finite".into());
        }
        if !self.initial_pheromone.is_finite() || self.initial_pheromone < 0.0 {
            return fail(format!(
                "initial_pheromone must be non-negative, got {}",
                self.initial_pheromone
            ));
        }
        if !self.constant_reinforcement.is_finite() || self.constant_reinforcement < 0.0 {
            return fail(format!(
                "constant_reinforcement must be non-negative, got {}",
                self.constant_reinforcement
            ));
        }
        if let Reinforcement::InverseLength { q } = self.reinforcement {
            if !(q > 0.0) || !q.is_finite() {
                return fail(format!("reinforcement q must be positive, got {}", q));
            }
        }
        Ok(())
    }
}

/// Best route found so far
#[derive(Debug, Clone, PartialEq)]
pub struct BestTour {
    pub route: Vec<Edge>,
    pub length: u64,
    /// Ant that built it
    pub ant: usize,
    /// Iteration (0-based) in which it was found
    pub iteration: usize,
}

/// Everything the colony mutates while it runs
#[derive(Debug, Clone)]
pub struct SimulationState {
    graph: DistanceGraph,
    ants: Vec<Ant>,
    unvisited: BTreeSet<NodeId>,
    best: Option<BestTour>,
    iteration: usize,
    history: Vec<u64>,
    rng: ChaCha8Rng,
}

impl SimulationState {
    pub fn new(graph: DistanceGraph, config: &ACOConfig) -> Self {
        let ants = (0..config.num_ants)
            .map(|id| Ant::new(id, config.vehicle_capacity))
            .collect();

        SimulationState {
            graph,
            ants,
            unvisited: BTreeSet::new(),
            best: None,
            iteration: 0,
            history: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Restore per-iteration state (ants, unvisited set); pheromone is kept
    pub fn reset(&mut self) {
        for ant in &mut self.ants {
            ant.reset();
        }
        self.unvisited.clear();
    }

    pub fn graph(&self) -> &DistanceGraph {
        &self.graph
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn best(&self) -> Option<&BestTour> {
        self.best.as_ref()
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Global best length after each completed iteration
    pub fn history(&self) -> &[u64] {
        &self.history
    }
}

/// Result of a single iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IterationOutcome {
    /// 0-based index of the iteration just completed
    pub iteration: usize,
    /// Tour length of every ant, in colony order
    pub ant_lengths: Vec<u64>,
    pub local_best_length: u64,
    pub global_best_length: u64,
    /// Whether the global best changed this iteration
    pub improved: bool,
}

/// Unvisited customers whose demand fits in `capacity`, ascending by id
pub fn possible_customers(
    graph: &DistanceGraph,
    unvisited: &BTreeSet<NodeId>,
    capacity: u32,
) -> Result<Vec<NodeId>> {
    let mut possible = Vec::with_capacity(unvisited.len());
    for &customer in unvisited {
        if graph.demand(customer)? <= capacity {
            possible.push(customer);
        }
    }
    Ok(possible)
}

/// Build one ant's complete route over every customer of the graph.
///
/// When no remaining customer fits, the ant returns to the depot and refills.
/// The route always ends with a move back to the depot.
pub fn construct_route<R: Rng>(
    ant: &mut Ant,
    graph: &DistanceGraph,
    unvisited: &mut BTreeSet<NodeId>,
    policy: &ConstructionPolicy,
    rng: &mut R,
) -> Result<()> {
    ant.reset();
    unvisited.clear();
    unvisited.extend(graph.customer_ids());

    while !unvisited.is_empty() {
        let mut possible = possible_customers(graph, unvisited, ant.capacity())?;

        if possible.is_empty() && !ant.current_position().is_depot() {
            log::trace!(
                "ant {} back to depot with {} capacity left",
                ant.id(),
                ant.capacity()
            );
            ant.record_move(NodeId::Depot);
            ant.reset_capacity();
            possible = possible_customers(graph, unvisited, ant.capacity())?;
        }

        let next = policy.select(graph, ant.current_position(), &possible, rng)?;
        ant.serve(graph.demand(next)?);
        ant.record_move(next);
        unvisited.remove(&next);
    }

    ant.record_move(NodeId::Depot);
    Ok(())
}

/// Sum of truncated distances over every edge of a route
pub fn tour_length(graph: &DistanceGraph, route: &[Edge]) -> Result<u64> {
    let mut length = 0;
    for edge in route {
        length += graph.node_distance(edge.from, edge.to)?;
    }
    Ok(length)
}

/// Ant colony solver: owns the configuration and the simulation state and
/// drives the construct / evaluate / update loop.
pub struct AntColony {
    config: ACOConfig,
    policy: ConstructionPolicy,
    state: SimulationState,
}

impl AntColony {
    pub fn new(graph: DistanceGraph, config: ACOConfig) -> Result<Self> {
        config.validate()?;
        if graph.num_customers() == 0 {
            return Err(AcoError::InvalidConfig(
                "the graph has no customers to serve".into(),
            ));
        }

        let policy = config.policy();
        let state = SimulationState::new(graph, &config);

        Ok(AntColony {
            config,
            policy,
            state,
        })
    }

    pub fn config(&self) -> &ACOConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Run one full iteration: construction, evaluation, pheromone update
    pub fn run_iteration(&mut self) -> Result<IterationOutcome> {
        self.state.reset();

        let SimulationState {
            graph,
            ants,
            unvisited,
            rng,
            ..
        } = &mut self.state;

        for ant in ants.iter_mut() {
            construct_route(ant, graph, &mut *unvisited, &self.policy, &mut *rng)?;
        }

        let ant_lengths = ants
            .iter()
            .map(|ant| tour_length(graph, ant.route()))
            .collect::<Result<Vec<u64>>>()?;

        // first minimum wins ties
        let mut best_ant = 0;
        for (i, &length) in ant_lengths.iter().enumerate() {
            if length < ant_lengths[best_ant] {
                best_ant = i;
            }
        }
        let local_best_length = ant_lengths[best_ant];

        self.local_decay();
        self.reinforce(best_ant, local_best_length)?;

        let iteration = self.state.iteration;
        let improved = match &self.state.best {
            Some(best) => local_best_length < best.length,
            None => true,
        };
        if improved {
            log::info!(
                "Iteration {}: new best tour length {} (ant {})",
                iteration,
                local_best_length,
                best_ant
            );
            self.state.best = Some(BestTour {
                route: self.state.ants[best_ant].route().to_vec(),
                length: local_best_length,
                ant: best_ant,
                iteration,
            });
        }

        let global_best_length = self.state.best.as_ref().map_or(local_best_length, |b| b.length);
        self.state.history.push(global_best_length);
        self.state.iteration += 1;

        log::debug!(
            "Iteration {}: local best {}, global best {}",
            iteration,
            local_best_length,
            global_best_length
        );

        Ok(IterationOutcome {
            iteration,
            ant_lengths,
            local_best_length,
            global_best_length,
            improved,
        })
    }

    /// Evaporation on every edge, blended toward the constant baseline
    fn local_decay(&mut self) {
        let rate = self.config.decay_rate();
        let baseline = self.config.constant_reinforcement;
        self.state
            .graph
            .update_all_pheromone(|tau| (1.0 - rate) * tau + rate * baseline);
    }

    /// For every ant, reinforce the edges it shares with the iteration-best route
    fn reinforce(&mut self, best_ant: usize, best_length: u64) -> Result<()> {
        let rate = self.config.decay_rate();
        let deposit = self.config.reinforcement.deposit(best_length);

        let best_edges: BTreeSet<EdgeKey> = self.state.ants[best_ant]
            .route()
            .iter()
            .map(Edge::key)
            .collect();

        let mut shared: Vec<EdgeKey> = Vec::new();
        for ant in &self.state.ants {
            let edges: BTreeSet<EdgeKey> = ant.route().iter().map(Edge::key).collect();
            shared.extend(edges.intersection(&best_edges).copied());
        }

        for key in shared {
            let (u, v) = key.endpoints();
            let tau = self.state.graph.pheromone(u, v)?;
            self.state
                .graph
                .set_pheromone(u, v, (1.0 - rate) * tau + rate * deposit)?;
        }

        Ok(())
    }

    /// Run the configured number of iterations and return the best solution
    pub fn run(&mut self) -> Result<Solution> {
        let start = std::time::Instant::now();
        log::info!(
            "Starting ACO: {} customers, {} ants, {} iterations",
            self.state.graph.num_customers(),
            self.config.num_ants,
            self.config.iterations
        );

        for _ in 0..self.config.iterations {
            self.run_iteration()?;
        }

        let mut solution = self.best_solution()?;
        solution.computation_time = start.elapsed().as_secs_f64();

        log::info!(
            "ACO finished: best tour length {} after {} iterations",
            solution.length,
            solution.iterations
        );
        Ok(solution)
    }

    /// Best solution found so far
    pub fn best_solution(&self) -> Result<Solution> {
        let best = self.state.best.as_ref().ok_or_else(|| {
            AcoError::InvalidConfig("no iteration has been run yet".into())
        })?;

        let mut solution =
            Solution::from_route(&self.state.graph, &best.route, self.config.vehicle_capacity)?;
        solution.iterations = self.state.iteration;
        solution.history = self.state.history.clone();
        Ok(solution)
    }

    /// The run summary record
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            iterations: self.state.iteration,
            alpha: self.config.alpha,
            beta: self.config.beta,
            customer_count: self.state.graph.num_customers(),
            q0: self.config.q0,
            best_tour_length: self.state.best.as_ref().map(|b| b.length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Coordinate, CustomerRecord};
    use crate::instance::demo_customers;

    fn demo_graph(initial_pheromone: f64) -> DistanceGraph {
        DistanceGraph::from_customers(Coordinate::new(-1.0, 0.0), &demo_customers(), initial_pheromone)
            .unwrap()
    }

    fn served_loads(graph: &DistanceGraph, route: &[Edge]) -> Vec<u32> {
        let mut loads = vec![0];
        for edge in route {
            if edge.to.is_depot() {
                loads.push(0);
            } else {
                *loads.last_mut().unwrap() += graph.demand(edge.to).unwrap();
            }
        }
        loads
    }

    #[test]
    fn test_config_validation() {
        assert!(ACOConfig::default().validate().is_ok());

        let bad = [
            ACOConfig { num_ants: 0, ..Default::default() },
            ACOConfig { iterations: 0, ..Default::default() },
            ACOConfig { vehicle_capacity: 0, ..Default::default() },
            ACOConfig { q0: 1.5, ..Default::default() },
            ACOConfig { alpha: 2.0, ..Default::default() },
            ACOConfig { evaporation: Some(-0.1), ..Default::default() },
            ACOConfig { initial_pheromone: -1.0, ..Default::default() },
            ACOConfig {
                reinforcement: Reinforcement::InverseLength { q: 0.0 },
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(AcoError::InvalidConfig(_))));
        }

        // a split decay rate frees alpha from [0, 1]
        let split = ACOConfig { alpha: 2.0, evaporation: Some(0.3), ..Default::default() };
        assert!(split.validate().is_ok());
        assert_eq!(split.decay_rate(), 0.3);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: ACOConfig =
            serde_json::from_str(r#"{"num_ants": 12, "reinforcement": {"mode": "inverse-length", "q": 100.0}}"#)
                .unwrap();
        assert_eq!(config.num_ants, 12);
        assert_eq!(config.reinforcement, Reinforcement::InverseLength { q: 100.0 });
        assert_eq!(config.vehicle_capacity, 50);
        assert_eq!(config.draw, DrawGranularity::PerDecision);
    }

    #[test]
    fn test_construct_route_single_trip() {
        let graph = demo_graph(5.0);
        let mut ant = Ant::new(0, 50);
        let mut unvisited = BTreeSet::new();
        let policy = ConstructionPolicy::new(1.0, 0.1, 0.9);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        construct_route(&mut ant, &graph, &mut unvisited, &policy, &mut rng).unwrap();

        assert!(unvisited.is_empty());
        assert_eq!(ant.route().len(), 5);
        assert_eq!(ant.route().first().unwrap().from, NodeId::Depot);
        assert_eq!(ant.route().last().unwrap().to, NodeId::Depot);
        // total demand 21 fits in one trip
        assert_eq!(ant.route().iter().filter(|e| e.to.is_depot()).count(), 1);
        assert_eq!(ant.capacity(), 50 - 21);
    }

    #[test]
    fn test_depot_return_when_nothing_fits() {
        let customers = vec![
            CustomerRecord::new(1, 10.0, 0.0, 6),
            CustomerRecord::new(2, 20.0, 0.0, 6),
        ];
        let graph =
            DistanceGraph::from_customers(Coordinate::new(0.0, 0.0), &customers, 1.0).unwrap();
        let mut ant = Ant::new(0, 10);
        let mut unvisited = BTreeSet::new();
        // greedy: always the nearest
        let policy = ConstructionPolicy::new(1.0, 1.0, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        construct_route(&mut ant, &graph, &mut unvisited, &policy, &mut rng).unwrap();

        let c1 = NodeId::Customer(1);
        let c2 = NodeId::Customer(2);
        assert_eq!(
            ant.route(),
            &[
                Edge::new(NodeId::Depot, c1),
                Edge::new(c1, NodeId::Depot),
                Edge::new(NodeId::Depot, c2),
                Edge::new(c2, NodeId::Depot),
            ]
        );
        // refilled to 10 at the depot, then served 6
        assert_eq!(ant.capacity(), 4);
        assert_eq!(tour_length(&graph, ant.route()).unwrap(), 60);
    }

    #[test]
    fn test_unservable_customer_is_selection_error() {
        let customers = vec![
            CustomerRecord::new(1, 10.0, 0.0, 3),
            CustomerRecord::new(2, 20.0, 0.0, 80),
        ];
        let graph =
            DistanceGraph::from_customers(Coordinate::new(0.0, 0.0), &customers, 1.0).unwrap();
        let config = ACOConfig { iterations: 1, ..Default::default() };
        let mut colony = AntColony::new(graph, config).unwrap();

        assert!(matches!(colony.run(), Err(AcoError::Selection(_))));
    }

    #[test]
    fn test_empty_graph_rejected() {
        let graph = DistanceGraph::new(Coordinate::new(0.0, 0.0), 1.0);
        assert!(matches!(
            AntColony::new(graph, ACOConfig::default()),
            Err(AcoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_end_to_end_single_iteration() {
        let config = ACOConfig {
            iterations: 1,
            vehicle_capacity: 50,
            seed: 2024,
            ..Default::default()
        };
        let mut colony = AntColony::new(demo_graph(5.0), config).unwrap();
        let solution = colony.run().unwrap();

        let best = colony.state().best().unwrap();
        let recomputed = tour_length(colony.state().graph(), &best.route).unwrap();
        assert_eq!(solution.length, recomputed);
        assert_eq!(colony.summary().best_tour_length, Some(recomputed));
        assert_eq!(colony.summary().customer_count, 4);
        assert_eq!(colony.summary().iterations, 1);

        // one trip covering all four customers
        assert_eq!(solution.trips.len(), 1);
        assert_eq!(solution.trips[0].load, 21);
        assert!(solution.feasible);
        assert_eq!(solution.tour.first(), Some(&NodeId::Depot));
        assert_eq!(solution.tour.last(), Some(&NodeId::Depot));
    }

    #[test]
    fn test_same_seed_same_result() {
        let run = || {
            let config = ACOConfig { iterations: 5, seed: 9, ..Default::default() };
            let mut colony = AntColony::new(demo_graph(5.0), config).unwrap();
            colony.run().unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.tour, b.tour);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_decay_then_reinforce_single_ant() {
        let config = ACOConfig {
            num_ants: 1,
            iterations: 1,
            evaporation: Some(0.5),
            constant_reinforcement: 5.0,
            ..Default::default()
        };
        let mut colony = AntColony::new(demo_graph(5.0), config).unwrap();
        let outcome = colony.run_iteration().unwrap();

        let length = outcome.local_best_length as f64;
        let best_edges: BTreeSet<EdgeKey> =
            colony.state().ants()[0].route().iter().map(Edge::key).collect();

        for (key, tau) in colony.state().graph().edges() {
            if best_edges.contains(&key) {
                // decay: 0.5*5 + 0.5*5 = 5; reinforce: 0.5*5 + 0.5*L
                assert_eq!(tau, 2.5 + 0.5 * length);
            } else {
                assert_eq!(tau, 5.0);
            }
        }
    }

    #[test]
    fn test_shared_edges_reinforced_once_per_ant() {
        // q0 = 1 with uniform pheromone: both ants build the same greedy route
        let config = ACOConfig {
            num_ants: 2,
            iterations: 1,
            q0: 1.0,
            evaporation: Some(0.5),
            ..Default::default()
        };
        let mut colony = AntColony::new(demo_graph(5.0), config).unwrap();
        let outcome = colony.run_iteration().unwrap();
        assert_eq!(outcome.ant_lengths[0], outcome.ant_lengths[1]);
        // equal lengths: the first ant in colony order is the iteration best
        assert_eq!(colony.state().best().unwrap().ant, 0);

        let l = outcome.local_best_length as f64;
        let once = 2.5 + 0.5 * l;
        let twice = 0.5 * once + 0.5 * l;

        let route = colony.state().ants()[0].route().to_vec();
        for edge in route {
            let tau = colony.state().graph().pheromone(edge.from, edge.to).unwrap();
            assert_eq!(tau, twice);
        }
    }

    #[test]
    fn test_inverse_length_reinforcement() {
        assert_eq!(Reinforcement::TourLength.deposit(300), 300.0);
        assert_eq!(Reinforcement::InverseLength { q: 600.0 }.deposit(300), 2.0);
    }

    #[test]
    fn test_pheromone_is_not_reset_between_iterations() {
        let config = ACOConfig {
            num_ants: 3,
            iterations: 2,
            evaporation: Some(0.2),
            ..Default::default()
        };
        let mut colony = AntColony::new(demo_graph(5.0), config).unwrap();
        colony.run_iteration().unwrap();
        let after_first: Vec<f64> = colony.state().graph().edges().map(|(_, t)| t).collect();
        assert!(after_first.iter().any(|&t| t != 5.0));

        colony.run_iteration().unwrap();
        let after_second: Vec<f64> = colony.state().graph().edges().map(|(_, t)| t).collect();
        assert_ne!(after_first, after_second);
        assert_eq!(colony.state().iteration(), 2);
    }

    #[test]
    fn test_best_tour_is_monotonic() {
        let customers: Vec<CustomerRecord> = (1..=12)
            .map(|i| {
                let angle = i as f64 * 0.7;
                CustomerRecord::new(i, 50.0 * angle.cos() * (i as f64 / 4.0), 50.0 * angle.sin(), 3 + i % 5)
            })
            .collect();
        let graph =
            DistanceGraph::from_customers(Coordinate::new(0.0, 0.0), &customers, 5.0).unwrap();
        let config = ACOConfig {
            num_ants: 6,
            iterations: 25,
            vehicle_capacity: 15,
            q0: 0.5,
            evaporation: Some(0.1),
            reinforcement: Reinforcement::InverseLength { q: 1000.0 },
            ..Default::default()
        };
        let mut colony = AntColony::new(graph, config).unwrap();
        let solution = colony.run().unwrap();

        assert_eq!(solution.history.len(), 25);
        assert!(solution.history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(*solution.history.last().unwrap(), solution.length);
        assert!(solution.feasible);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn instance() -> impl Strategy<Value = (Vec<CustomerRecord>, u32)> {
            (5_u32..40).prop_flat_map(|capacity| {
                let customer = (-100.0_f64..100.0, -100.0_f64..100.0, 1..=capacity);
                (prop::collection::vec(customer, 1..12), Just(capacity))
            })
            .prop_map(|(raw, capacity)| {
                let customers = raw
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y, d))| CustomerRecord::new(i as u32 + 1, x, y, d))
                    .collect();
                (customers, capacity)
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(48))]

            /// Every route respects capacity, covers each customer once, and
            /// pheromone never turns negative.
            #[test]
            fn prop_routes_are_feasible(
                (customers, capacity) in instance(),
                seed in any::<u64>(),
                q0 in 0.0_f64..=1.0,
                rate in 0.0_f64..=1.0,
            ) {
                let graph = DistanceGraph::from_customers(
                    Coordinate::new(0.0, 0.0), &customers, 5.0).unwrap();
                let config = ACOConfig {
                    num_ants: 3,
                    iterations: 3,
                    vehicle_capacity: capacity,
                    q0,
                    evaporation: Some(rate),
                    seed,
                    ..Default::default()
                };
                let mut colony = AntColony::new(graph, config).unwrap();

                for _ in 0..3 {
                    colony.run_iteration().unwrap();
                    let graph = colony.state().graph();

                    for ant in colony.state().ants() {
                        let route = ant.route();
                        prop_assert_eq!(route.first().map(|e| e.from), Some(NodeId::Depot));
                        prop_assert_eq!(route.last().map(|e| e.to), Some(NodeId::Depot));

                        for load in served_loads(graph, route) {
                            prop_assert!(load <= capacity);
                        }

                        let mut served: Vec<NodeId> = route
                            .iter()
                            .map(|e| e.to)
                            .filter(|n| !n.is_depot())
                            .collect();
                        served.sort();
                        let expected: Vec<NodeId> = graph.customer_ids().collect();
                        prop_assert_eq!(served, expected);
                    }

                    for (_, tau) in graph.edges() {
                        prop_assert!(tau >= 0.0);
                    }
                }

                let history = colony.state().history();
                prop_assert!(history.windows(2).all(|w| w[1] <= w[0]));
            }
        }
    }
}
