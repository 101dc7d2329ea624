//! Benchmarking module for the CVRP ant colony.
//!
//! Repeats runs over several seeds for one or more configuration variants,
//! collects per-run results, and aggregates statistics for comparison.

use crate::error::Result;
use crate::graph::DistanceGraph;
use crate::heuristics::aco::{ACOConfig, AntColony, Reinforcement};
use crate::heuristics::construction::DrawGranularity;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Result of a single seeded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Configuration variant name
    pub variant: String,
    pub seed: u64,
    pub customers: usize,
    pub best_tour_length: u64,
    pub trips: usize,
    pub feasible: bool,
    /// Computation time in seconds
    pub time: f64,
    pub iterations: usize,
    /// Iteration in which the final best was first reached
    pub best_iteration: usize,
}

/// Aggregated statistics for one variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantStatistics {
    pub variant: String,
    pub num_runs: usize,
    pub num_feasible: usize,
    pub best_length: f64,
    pub avg_length: f64,
    pub worst_length: f64,
    pub std_length: f64,
    pub avg_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of seeded runs per variant (seeds 0..num_runs)
    pub num_runs: usize,
    /// Run seeds of a variant on the rayon pool
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            parallel: true,
        }
    }
}

/// Named configuration variants derived from a base configuration
pub fn standard_variants(base: &ACOConfig) -> Vec<(String, ACOConfig)> {
    vec![
        ("ACS".to_string(), base.clone()),
        (
            "ACS-inverse-length".to_string(),
            ACOConfig {
                reinforcement: Reinforcement::InverseLength { q: 1000.0 },
                ..base.clone()
            },
        ),
        (
            "ACS-per-candidate".to_string(),
            ACOConfig {
                draw: DrawGranularity::PerCandidate,
                ..base.clone()
            },
        ),
    ]
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Run one seeded solve
    fn run_once(variant: &str, graph: &DistanceGraph, config: &ACOConfig, seed: u64) -> Result<RunResult> {
        let config = ACOConfig {
            seed,
            ..config.clone()
        };
        let mut colony = AntColony::new(graph.clone(), config)?;
        let solution = colony.run()?;
        let best_iteration = colony.state().best().map_or(0, |b| b.iteration);

        Ok(RunResult {
            variant: variant.to_string(),
            seed,
            customers: graph.num_customers(),
            best_tour_length: solution.length,
            trips: solution.num_trips(),
            feasible: solution.feasible,
            time: solution.computation_time,
            iterations: solution.iterations,
            best_iteration,
        })
    }

    /// Run every seed for one variant and record the results
    pub fn run_variant(&mut self, variant: &str, graph: &DistanceGraph, config: &ACOConfig) -> Result<()> {
        log::info!("Benchmarking variant {} ({} runs)", variant, self.config.num_runs);

        let seeds: Vec<u64> = (0..self.config.num_runs as u64).collect();
        let runs: Vec<RunResult> = if self.config.parallel {
            seeds
                .into_par_iter()
                .map(|seed| Self::run_once(variant, graph, config, seed))
                .collect::<Result<Vec<_>>>()?
        } else {
            seeds
                .into_iter()
                .map(|seed| Self::run_once(variant, graph, config, seed))
                .collect::<Result<Vec<_>>>()?
        };

        self.results.extend(runs);
        Ok(())
    }

    /// Run all variants in order
    pub fn run_variants(&mut self, graph: &DistanceGraph, variants: &[(String, ACOConfig)]) -> Result<()> {
        for (name, config) in variants {
            self.run_variant(name, graph, config)?;
        }
        Ok(())
    }

    /// Compute statistics for each variant, best average first
    pub fn compute_statistics(&self) -> Vec<VariantStatistics> {
        let mut by_variant: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for result in &self.results {
            by_variant.entry(result.variant.as_str()).or_default().push(result);
        }

        let mut statistics = Vec::new();

        for (variant, results) in by_variant {
            let feasible: Vec<&&RunResult> = results.iter().filter(|r| r.feasible).collect();
            if feasible.is_empty() {
                continue;
            }

            let lengths: Vec<f64> = feasible.iter().map(|r| r.best_tour_length as f64).collect();
            let times: Vec<f64> = feasible.iter().map(|r| r.time).collect();

            let std_length = if lengths.len() > 1 {
                lengths.iter().std_dev()
            } else {
                0.0
            };

            statistics.push(VariantStatistics {
                variant: variant.to_string(),
                num_runs: results.len(),
                num_feasible: feasible.len(),
                best_length: lengths.iter().cloned().fold(f64::INFINITY, f64::min),
                avg_length: lengths.iter().mean(),
                worst_length: lengths.iter().cloned().fold(0.0, f64::max),
                std_length,
                avg_time: times.iter().mean(),
            });
        }

        statistics.sort_by_key(|s| OrderedFloat(s.avg_length));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("        CVRP ACO Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        report.push_str(&format!(
            "{:<22} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "Variant", "Feasible", "Best", "Average", "Worst", "Std", "Avg Time"
        ));
        report.push_str("-".repeat(88).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<22} {:>10} {:>10.0} {:>10.2} {:>10.0} {:>10.2} {:>10.4}\n",
                stat.variant,
                format!("{}/{}", stat.num_feasible, stat.num_runs),
                stat.best_length,
                stat.avg_length,
                stat.worst_length,
                stat.std_length,
                stat.avg_time
            ));
        }

        report.push_str("-".repeat(88).as_str());
        report.push('\n');

        if let Some(best) = self.results.iter().filter(|r| r.feasible).min_by_key(|r| r.best_tour_length) {
            report.push_str(&format!(
                "\nBest run: {} (seed {}) length {} in {} trips\n",
                best.variant, best.seed, best.best_tour_length, best.trips
            ));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}
