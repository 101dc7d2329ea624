//! Error types for the CVRP ant colony solver.

use crate::graph::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, AcoError>;

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum AcoError {
    /// The customer table could not be opened or read
    #[error("cannot read customer data from {path:?}: {source}")]
    DataSource {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A node required by an operation is missing an attribute (or is unknown to the graph)
    #[error("node {node} has no {attribute} attribute")]
    MissingAttribute {
        node: NodeId,
        attribute: &'static str,
    },

    /// The construction policy was asked to choose from an empty candidate set
    #[error("selection failed: {0}")]
    Selection(String),

    /// A node id was inserted twice into the graph
    #[error("duplicate node {0}")]
    DuplicateNode(NodeId),

    /// Invalid solver configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AcoError {
    pub(crate) fn missing(node: NodeId, attribute: &'static str) -> Self {
        AcoError::MissingAttribute { node, attribute }
    }
}
