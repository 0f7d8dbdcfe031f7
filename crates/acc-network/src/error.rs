//! Network-subsystem error types.
//!
//! Both [`GeometryError`] and [`GraphError`] are structural: once either is
//! raised there is no sound network to route on, and the run aborts.

use thiserror::Error;

use acc_core::NodeId;

/// Malformed input line geometry.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("no line geometries supplied")]
    Empty,

    #[error("line {line} has {count} coordinate(s); at least 2 are required")]
    TooFewCoordinates { line: usize, count: usize },

    #[error("line {line} has a non-finite coordinate at vertex {vertex}")]
    NonFinite { line: usize, vertex: usize },

    #[error("line {line} has zero length")]
    ZeroLength { line: usize },
}

/// Invalid node/edge topology handed to the graph builder.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode { edge: usize, node: NodeId },

    #[error("edge {edge} has invalid weight {weight}; weights must be finite and >= 0")]
    InvalidWeight { edge: usize, weight: f64 },

    #[error("edge {edge} is a self-loop on {node}")]
    SelfLoop { edge: usize, node: NodeId },

    #[error("node {0} has a non-finite position")]
    InvalidPosition(NodeId),
}

/// Errors produced by `acc-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("graph construction error: {0}")]
    Graph(#[from] GraphError),

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
