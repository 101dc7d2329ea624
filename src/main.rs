//! CVRP ACO Solver - Command Line Interface
//!
//! Solves a capacitated vehicle routing problem with an ant colony.

use clap::{Args, Parser, Subcommand, ValueEnum};
use cvrp_aco::benchmark::{standard_variants, Benchmark, BenchmarkConfig};
use cvrp_aco::error::{AcoError, Result};
use cvrp_aco::graph::{Coordinate, DistanceGraph};
use cvrp_aco::heuristics::aco::{ACOConfig, AntColony, Reinforcement};
use cvrp_aco::heuristics::construction::DrawGranularity;
use cvrp_aco::instance::{demo_customers, CustomerSource, InstanceStatistics};
use indicatif::{ProgressBar, ProgressStyle};

use std::path::PathBuf;
use std::time::Instant;

/// Q used by `--reinforcement inverse-length` when no other value is known
const DEFAULT_REINFORCEMENT_Q: f64 = 100.0;

#[derive(Parser)]
#[command(name = "cvrp-aco")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Ant Colony Optimization solver for the capacitated vehicle routing problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance
    Solve {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        solver: SolverArgs,

        /// Write the best solution as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append the run summary as a CSV row
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Print every trip of the best tour
        #[arg(short, long)]
        verbose: bool,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Analyze an instance
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Vehicle capacity used for the trip lower bound
        #[arg(long, default_value = "50")]
        capacity: u32,
    },

    /// Repeat runs over several seeds and compare configuration variants
    Benchmark {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        solver: SolverArgs,

        /// Number of seeded runs per variant
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Benchmark only the given configuration instead of the standard variants
        #[arg(long)]
        single: bool,

        /// Run seeds one after another
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Customer table (customer_id,x,y,demand); the built-in 4-customer instance when omitted
    #[arg(short, long)]
    customers: Option<PathBuf>,

    /// The customer table has no header row
    #[arg(long)]
    no_headers: bool,

    /// Field delimiter of the customer table
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Depot x coordinate
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    depot_x: f64,

    /// Depot y coordinate
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    depot_y: f64,
}

#[derive(Args)]
struct SolverArgs {
    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ants
    #[arg(long)]
    num_ants: Option<usize>,

    /// Number of iterations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Pheromone exponent (also the decay rate unless --evaporation is given)
    #[arg(long)]
    alpha: Option<f64>,

    /// Inverse-distance exponent
    #[arg(long)]
    beta: Option<f64>,

    /// Exploitation probability
    #[arg(long)]
    q0: Option<f64>,

    /// Vehicle capacity
    #[arg(long)]
    capacity: Option<u32>,

    /// Pheromone seeded on every edge
    #[arg(long)]
    initial_pheromone: Option<f64>,

    /// Baseline the decay blends toward
    #[arg(long)]
    constant_reinforcement: Option<f64>,

    /// Decay rate, separate from alpha
    #[arg(long)]
    evaporation: Option<f64>,

    /// Reinforcement target along the best tour
    #[arg(long, value_enum)]
    reinforcement: Option<ReinforcementArg>,

    /// Q numerator for inverse-length reinforcement (default 100)
    #[arg(long)]
    reinforcement_q: Option<f64>,

    /// Granularity of the exploitation draw
    #[arg(long, value_enum)]
    draw: Option<DrawArg>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ReinforcementArg {
    /// Blend toward the best tour length
    TourLength,
    /// Blend toward Q / best tour length
    InverseLength,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum DrawArg {
    /// One draw per decision
    PerDecision,
    /// One draw per candidate
    PerCandidate,
}

impl SolverArgs {
    fn to_config(&self) -> Result<ACOConfig> {
        let mut config = match &self.config {
            Some(path) => ACOConfig::from_json_file(path)?,
            None => ACOConfig::default(),
        };

        if let Some(v) = self.num_ants {
            config.num_ants = v;
        }
        if let Some(v) = self.iterations {
            config.iterations = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        if let Some(v) = self.beta {
            config.beta = v;
        }
        if let Some(v) = self.q0 {
            config.q0 = v;
        }
        if let Some(v) = self.capacity {
            config.vehicle_capacity = v;
        }
        if let Some(v) = self.initial_pheromone {
            config.initial_pheromone = v;
        }
        if let Some(v) = self.constant_reinforcement {
            config.constant_reinforcement = v;
        }
        if self.evaporation.is_some() {
            config.evaporation = self.evaporation;
        }
        if let Some(v) = self.reinforcement {
            config.reinforcement = match (v, config.reinforcement) {
                (ReinforcementArg::TourLength, _) => Reinforcement::TourLength,
                (ReinforcementArg::InverseLength, Reinforcement::InverseLength { q }) => {
                    Reinforcement::InverseLength { q }
                }
                (ReinforcementArg::InverseLength, Reinforcement::TourLength) => {
                    Reinforcement::InverseLength {
                        q: DEFAULT_REINFORCEMENT_Q,
                    }
                }
            };
        }
        if let (Some(v), Reinforcement::InverseLength { q }) =
            (self.reinforcement_q, &mut config.reinforcement)
        {
            *q = v;
        }
        if let Some(v) = self.draw {
            config.draw = match v {
                DrawArg::PerDecision => DrawGranularity::PerDecision,
                DrawArg::PerCandidate => DrawGranularity::PerCandidate,
            };
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }

        config.validate()?;
        Ok(config)
    }
}

impl InputArgs {
    fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(AcoError::InvalidConfig(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }

    /// Build the graph; returns it with the number of skipped rows
    fn load(&self, initial_pheromone: f64) -> Result<(DistanceGraph, usize)> {
        let depot = Coordinate::new(self.depot_x, self.depot_y);

        let (customers, skipped) = match &self.customers {
            Some(path) => {
                let source = CustomerSource {
                    has_headers: !self.no_headers,
                    delimiter: self.delimiter_byte()?,
                };
                let report = source.load(path)?;
                let skipped = report.skipped_count();
                (report.customers, skipped)
            }
            None => {
                println!("No customer file given, using the built-in 4-customer instance");
                (demo_customers(), 0)
            }
        };

        let graph = DistanceGraph::from_customers(depot, &customers, initial_pheromone)?;
        Ok((graph, skipped))
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { input, solver, output, summary, verbose, quiet } => {
            solve_instance(&input, &solver, output, summary, verbose, quiet)
        }

        Commands::Analyze { input, capacity } => analyze_instance(&input, capacity),

        Commands::Benchmark { input, solver, runs, output, single, sequential } => {
            run_benchmark(&input, &solver, runs, &output, single, sequential)
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_instance(
    input: &InputArgs,
    solver: &SolverArgs,
    output: Option<PathBuf>,
    summary_path: Option<PathBuf>,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let config = solver.to_config()?;
    let (graph, skipped) = input.load(config.initial_pheromone)?;

    println!(
        "Loaded {} customers ({} rows skipped)",
        graph.num_customers(),
        skipped
    );

    let iterations = config.iterations;
    let mut colony = AntColony::new(graph, config)?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(iterations as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} iterations, best {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    };

    let start = Instant::now();
    for _ in 0..iterations {
        let outcome = colony.run_iteration()?;
        progress.set_message(outcome.global_best_length.to_string());
        progress.inc(1);
    }
    progress.finish_and_clear();

    let mut solution = colony.best_solution()?;
    solution.computation_time = start.elapsed().as_secs_f64();
    let summary = colony.summary();

    println!("\n========== Results ==========");
    print!("{}", summary);
    println!("Trips: {}", solution.num_trips());
    println!("Feasible: {}", solution.feasible);
    println!("Time: {:.4}s", solution.computation_time);

    if verbose {
        println!("\n{}", solution);
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(summary_path) = summary_path {
        summary.append_to_csv(&summary_path)?;
        println!("Summary appended to {:?}", summary_path);
    }

    Ok(())
}

fn analyze_instance(input: &InputArgs, capacity: u32) -> Result<()> {
    let (graph, skipped) = input.load(ACOConfig::default().initial_pheromone)?;
    let stats = InstanceStatistics::compute(&graph, capacity, skipped);

    println!("========== Instance Analysis ==========\n");
    println!("{}", stats);

    if stats.max_demand > capacity {
        println!(
            "Warning: the largest demand ({}) exceeds the vehicle capacity ({})",
            stats.max_demand, capacity
        );
    }

    Ok(())
}

fn run_benchmark(
    input: &InputArgs,
    solver: &SolverArgs,
    runs: usize,
    output: &PathBuf,
    single: bool,
    sequential: bool,
) -> Result<()> {
    let base = solver.to_config()?;
    let (graph, _) = input.load(base.initial_pheromone)?;

    std::fs::create_dir_all(output)?;

    let variants = if single {
        vec![("ACS".to_string(), base)]
    } else {
        standard_variants(&base)
    };

    let mut benchmark = Benchmark::new(BenchmarkConfig {
        num_runs: runs,
        parallel: !sequential,
    });

    println!(
        "Benchmarking {} variant(s) x {} runs on {} customers...",
        variants.len(),
        runs,
        graph.num_customers()
    );
    benchmark.run_variants(&graph, &variants)?;

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_solve(args: &[&str]) -> (InputArgs, SolverArgs) {
        let mut argv = vec!["cvrp-aco", "solve"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Solve { input, solver, .. } => (input, solver),
            _ => unreachable!("parsed a solve command"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let (_, solver) = parse_solve(&["--num-ants", "8", "--alpha", "0.5", "--draw", "per-candidate"]);
        let config = solver.to_config().unwrap();

        assert_eq!(config.num_ants, 8);
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.draw, DrawGranularity::PerCandidate);
        assert_eq!(config.reinforcement, Reinforcement::TourLength);
    }

    #[test]
    fn test_inverse_length_uses_default_q() {
        let (_, solver) = parse_solve(&["--reinforcement", "inverse-length"]);
        let config = solver.to_config().unwrap();
        assert_eq!(
            config.reinforcement,
            Reinforcement::InverseLength { q: DEFAULT_REINFORCEMENT_Q }
        );

        // q alone does not switch the mode
        let (_, solver) = parse_solve(&["--reinforcement-q", "7"]);
        assert_eq!(solver.to_config().unwrap().reinforcement, Reinforcement::TourLength);
    }

    #[test]
    fn test_reinforcement_q_overrides_config_file() {
        let path = std::env::temp_dir().join(format!("cvrp_aco_cli_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"reinforcement": {"mode": "inverse-length", "q": 500.0}}"#).unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let (_, solver) = parse_solve(&["--config", &path_arg]);
        assert_eq!(
            solver.to_config().unwrap().reinforcement,
            Reinforcement::InverseLength { q: 500.0 }
        );

        let (_, solver) = parse_solve(&["--config", &path_arg, "--reinforcement-q", "7"]);
        assert_eq!(
            solver.to_config().unwrap().reinforcement,
            Reinforcement::InverseLength { q: 7.0 }
        );

        // naming the mode again keeps the q from the file
        let (_, solver) = parse_solve(&["--config", &path_arg, "--reinforcement", "inverse-length"]);
        assert_eq!(
            solver.to_config().unwrap().reinforcement,
            Reinforcement::InverseLength { q: 500.0 }
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let (input, _) = parse_solve(&["--delimiter", "\u{a7}"]);
        assert!(matches!(input.delimiter_byte(), Err(AcoError::InvalidConfig(_))));

        let (input, _) = parse_solve(&["--delimiter", ";"]);
        assert_eq!(input.delimiter_byte().unwrap(), b';');
    }
}
