//! Loading CVRP customer tables and describing instances.
//!
//! The customer source is a delimited table with one row per customer:
//! `customer_id, x, y, demand`. Malformed rows are skipped and reported in
//! the returned [`LoadReport`] instead of aborting the load.

use crate::error::{AcoError, Result};
use crate::graph::{distance, CustomerRecord, DistanceGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Why a single input row was not turned into a customer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("duplicate customer id {0}")]
    DuplicateId(u32),

    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// A skipped row and the reason it was rejected
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the source, when known
    pub line: Option<u64>,
    pub reason: RowError,
}

/// Result of reading a customer table
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub customers: Vec<CustomerRecord>,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Reader options for the customer table
#[derive(Debug, Clone)]
pub struct CustomerSource {
    pub has_headers: bool,
    pub delimiter: u8,
}

impl Default for CustomerSource {
    fn default() -> Self {
        CustomerSource {
            has_headers: true,
            delimiter: b',',
        }
    }
}

impl CustomerSource {
    /// Read customers from a file. A missing or unreadable file is a `DataSource` error.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| AcoError::DataSource {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;

        let report = self.read(file).map_err(|source| AcoError::DataSource {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Loaded {} customers from {:?} ({} rows skipped)",
            report.customers.len(),
            path,
            report.skipped_count()
        );
        Ok(report)
    }

    /// Read customers from any reader. Bad rows land in `skipped`; only an
    /// I/O failure of the underlying reader is returned as an error.
    pub fn read<R: Read>(&self, reader: R) -> std::result::Result<LoadReport, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut report = LoadReport::default();
        let mut seen = HashSet::new();

        for row in csv_reader.records() {
            let (line, parsed) = match row {
                Ok(record) => {
                    let line = record.position().map(|p| p.line());
                    (line, parse_row(&record))
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e),
                Err(e) => {
                    let line = e.position().map(|p| p.line());
                    (line, Err(RowError::Unreadable(e.to_string())))
                }
            };

            let parsed = parsed.and_then(|customer| {
                if seen.insert(customer.id) {
                    Ok(customer)
                } else {
                    Err(RowError::DuplicateId(customer.id))
                }
            });

            match parsed {
                Ok(customer) => report.customers.push(customer),
                Err(reason) => {
                    log::warn!("Skipping row {:?}: {}", line, reason);
                    report.skipped.push(SkippedRow { line, reason });
                }
            }
        }

        Ok(report)
    }
}

fn parse_row(record: &csv::StringRecord) -> std::result::Result<CustomerRecord, RowError> {
    if record.len() != 4 {
        return Err(RowError::FieldCount(record.len()));
    }

    let id = parse_field::<u32>(record, 0, "customer id")?;
    let x = parse_field::<f64>(record, 1, "x coordinate")?;
    let y = parse_field::<f64>(record, 2, "y coordinate")?;
    let demand = parse_field::<u32>(record, 3, "demand")?;

    if !x.is_finite() || !y.is_finite() {
        return Err(RowError::InvalidNumber {
            field: "coordinate",
            value: format!("({}, {})", x, y),
        });
    }

    Ok(CustomerRecord::new(id, x, y, demand))
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    field: &'static str,
) -> std::result::Result<T, RowError> {
    let value = &record[index];
    value.parse().map_err(|_| RowError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// The four-customer instance used when no data file is given
pub fn demo_customers() -> Vec<CustomerRecord> {
    vec![
        CustomerRecord::new(1, 45.0, 60.0, 4),
        CustomerRecord::new(2, -45.0, 60.0, 5),
        CustomerRecord::new(3, 45.0, -60.0, 5),
        CustomerRecord::new(4, -45.0, -60.0, 7),
    ]
}

/// Statistics about a CVRP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub num_customers: usize,
    pub vehicle_capacity: u32,
    pub total_demand: u64,
    pub min_demand: u32,
    pub max_demand: u32,
    pub avg_demand: f64,
    /// Lower bound on depot round trips: ceil(total demand / capacity)
    pub min_trips: u64,
    pub avg_depot_distance: f64,
    pub max_depot_distance: u64,
    pub skipped_rows: usize,
}

impl InstanceStatistics {
    pub fn compute(graph: &DistanceGraph, vehicle_capacity: u32, skipped_rows: usize) -> Self {
        let depot = graph.depot();
        let demands: Vec<u32> = graph.customers().map(|(_, a)| a.demand).collect();
        let depot_distances: Vec<u64> = graph
            .customers()
            .map(|(_, a)| distance(depot, a.coord))
            .collect();

        let total_demand = graph.total_demand();
        let n = demands.len();
        let avg = |sum: f64| if n == 0 { 0.0 } else { sum / n as f64 };

        let min_trips = if vehicle_capacity == 0 {
            0
        } else {
            total_demand.div_ceil(vehicle_capacity as u64)
        };

        InstanceStatistics {
            num_customers: n,
            vehicle_capacity,
            total_demand,
            min_demand: demands.iter().copied().min().unwrap_or(0),
            max_demand: demands.iter().copied().max().unwrap_or(0),
            avg_demand: avg(total_demand as f64),
            min_trips,
            avg_depot_distance: avg(depot_distances.iter().sum::<u64>() as f64),
            max_depot_distance: depot_distances.iter().copied().max().unwrap_or(0),
            skipped_rows,
        }
    }
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance:")?;
        writeln!(f, "  Customers: {} (+ 1 depot)", self.num_customers)?;
        writeln!(f, "  Vehicle capacity: {}", self.vehicle_capacity)?;
        writeln!(f, "  Total demand: {}", self.total_demand)?;
        writeln!(
            f,
            "  Demand min/avg/max: {}/{:.2}/{}",
            self.min_demand, self.avg_demand, self.max_demand
        )?;
        writeln!(f, "  Minimum trips: {}", self.min_trips)?;
        writeln!(f, "  Avg depot distance: {:.2}", self.avg_depot_distance)?;
        writeln!(f, "  Max depot distance: {}", self.max_depot_distance)?;
        writeln!(f, "  Skipped rows: {}", self.skipped_rows)
    }
}
