//! `acc-network` — routable network construction, shortest paths, and
//! access-node snapping.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`normalize`] | `normalize`, `NormalizeOptions`, `Topology`, `TopoEdge`   |
//! | [`network`]   | `Network` (CSR + R-tree), `NetworkBuilder`                |
//! | [`router`]    | `ShortestPaths` trait, `Dijkstra`, `Route`, `DistanceMap` |
//! | [`resolve`]   | `Network::resolve`, `Network::nodes_within`, `resolve`    |
//! | [`error`]     | `NetworkError`, `GeometryError`, `GraphError`             |
//!
//! # Pipeline
//!
//! ```text
//! Vec<LineString> ──normalize──▶ Topology ──into_network──▶ Network
//!                                                            │
//!                   resolve(point, radius) ◀─────────────────┤
//!                   shortest_path_distances_from(node, max) ◀┘
//! ```

pub mod error;
pub mod network;
pub mod normalize;
pub mod resolve;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{GeometryError, GraphError, NetworkError, NetworkResult};
pub use network::{Network, NetworkBuilder};
pub use normalize::{normalize, NormalizeOptions, TopoEdge, Topology};
pub use resolve::resolve;
pub use router::{Dijkstra, DistanceMap, Route, ShortestPaths};
