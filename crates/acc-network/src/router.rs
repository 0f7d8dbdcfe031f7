//! Shortest-path trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `acc-run` calls routing through the [`ShortestPaths`] trait, so callers
//! can swap in another engine (contraction hierarchies, A*) without touching
//! the aggregation code.  The default [`Dijkstra`] is a plain binary-heap
//! search and is sufficient for radius-bounded accessibility queries.
//!
//! # Unreachable
//!
//! "No path" is a normal outcome on a possibly disconnected mesh and is
//! returned as `Ok(None)`, never as an error.  Errors are reserved for node
//! ids that do not belong to the network.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use geo::{Coord, LineString};
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use acc_core::{EdgeId, NodeId};

use crate::network::Network;
use crate::{NetworkError, NetworkResult};

/// Node → network distance for every node settled by a bounded search.
pub type DistanceMap = FxHashMap<NodeId, f64>;

// ── Route ─────────────────────────────────────────────────────────────────────

/// A shortest path: the visited nodes, the edges between them, and the
/// total distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes in order from source to target, both included.
    pub nodes:    Vec<NodeId>,
    /// Edges to traverse in order; `edges.len() == nodes.len() - 1`.
    pub edges:    Vec<EdgeId>,
    pub distance: f64,
}

impl Route {
    /// `true` if the source and target are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Polyline through the route's node positions, for visualisation.
    pub fn to_line_string(&self, network: &Network) -> LineString<f64> {
        self.nodes
            .iter()
            .filter_map(|&n| network.position(n))
            .map(|p| Coord { x: p.x, y: p.y })
            .collect()
    }
}

// ── ShortestPaths trait ───────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: one engine is shared by every
/// worker while origins are processed in parallel.
pub trait ShortestPaths: Send + Sync {
    /// Minimum total edge weight between two nodes; `Ok(None)` if no path
    /// exists.  `from == to` yields `Some(0.0)`.
    fn distance(&self, network: &Network, from: NodeId, to: NodeId) -> NetworkResult<Option<f64>>;

    /// Every node whose distance from `source` is at most `max_distance`,
    /// `source` itself included at distance 0.
    fn distances_from(
        &self,
        network: &Network,
        source: NodeId,
        max_distance: f64,
    ) -> NetworkResult<DistanceMap>;

    /// The shortest path itself; `Ok(None)` if no path exists.
    fn route(&self, network: &Network, from: NodeId, to: NodeId) -> NetworkResult<Option<Route>>;
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR graph using `edge_weight` as cost.
///
/// Per-query state is kept in hash maps rather than `node_count`-sized
/// vectors, so a radius-bounded search costs proportional to the area it
/// explores, not to the whole network.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

impl ShortestPaths for Dijkstra {
    fn distance(&self, network: &Network, from: NodeId, to: NodeId) -> NetworkResult<Option<f64>> {
        check_node(network, from)?;
        check_node(network, to)?;
        let settled = search(network, from, Some(to), f64::INFINITY, None);
        Ok(settled.get(&to).copied())
    }

    fn distances_from(
        &self,
        network: &Network,
        source: NodeId,
        max_distance: f64,
    ) -> NetworkResult<DistanceMap> {
        check_node(network, source)?;
        Ok(search(network, source, None, max_distance, None))
    }

    fn route(&self, network: &Network, from: NodeId, to: NodeId) -> NetworkResult<Option<Route>> {
        check_node(network, from)?;
        check_node(network, to)?;
        let mut prev = FxHashMap::default();
        let settled = search(network, from, Some(to), f64::INFINITY, Some(&mut prev));
        Ok(settled
            .get(&to)
            .map(|&distance| reconstruct(&prev, from, to, distance)))
    }
}

// ── Convenience queries on Network ────────────────────────────────────────────

impl Network {
    /// [`Dijkstra::distance`] on this network.
    pub fn shortest_path_distance(&self, from: NodeId, to: NodeId) -> NetworkResult<Option<f64>> {
        Dijkstra.distance(self, from, to)
    }

    /// [`Dijkstra::distances_from`] on this network.
    pub fn shortest_path_distances_from(
        &self,
        source: NodeId,
        max_distance: f64,
    ) -> NetworkResult<DistanceMap> {
        Dijkstra.distances_from(self, source, max_distance)
    }

    /// [`Dijkstra::route`] on this network.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> NetworkResult<Option<Route>> {
        Dijkstra.route(self, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

type Predecessors = FxHashMap<NodeId, (NodeId, EdgeId)>;

fn check_node(network: &Network, node: NodeId) -> NetworkResult<()> {
    if network.contains(node) {
        Ok(())
    } else {
        Err(NetworkError::NodeNotFound(node))
    }
}

/// Run Dijkstra from `source`, stopping early once `target` is settled.
///
/// Returns the settled nodes and their final distances.  Nodes further than
/// `max_distance` are never settled.
fn search(
    network: &Network,
    source: NodeId,
    target: Option<NodeId>,
    max_distance: f64,
    mut prev: Option<&mut Predecessors>,
) -> DistanceMap {
    let mut settled: DistanceMap = FxHashMap::default();
    if max_distance.is_nan() || max_distance < 0.0 {
        return settled;
    }

    // best[v] = best known distance to v (may not be settled yet).
    let mut best: DistanceMap = FxHashMap::default();
    best.insert(source, 0.0);

    // Min-heap: (distance, node). Reverse makes BinaryHeap (max) behave as
    // min-heap; the NodeId secondary key makes tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(dist), node))) = heap.pop() {
        // Skip stale heap entries.
        if settled.contains_key(&node) {
            continue;
        }
        settled.insert(node, dist);
        if Some(node) == target {
            break;
        }

        for (neighbor, weight, edge) in network.arcs(node) {
            if settled.contains_key(&neighbor) {
                continue;
            }
            let candidate = dist + weight;
            if candidate > max_distance {
                continue;
            }
            let improves = best.get(&neighbor).is_none_or(|&d| candidate < d);
            if improves {
                best.insert(neighbor, candidate);
                if let Some(prev) = prev.as_deref_mut() {
                    prev.insert(neighbor, (node, edge));
                }
                heap.push(Reverse((OrderedFloat(candidate), neighbor)));
            }
        }
    }

    settled
}

fn reconstruct(prev: &Predecessors, from: NodeId, to: NodeId, distance: f64) -> Route {
    let mut nodes = vec![to];
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        match prev.get(&cur) {
            Some(&(p, e)) => {
                edges.push(e);
                nodes.push(p);
                cur = p;
            }
            None => break,
        }
    }
    nodes.reverse();
    edges.reverse();
    Route { nodes, edges, distance }
}
