//! Per-origin distance cache.
//!
//! One bounded Dijkstra per origin yields the network distance to every node
//! within `max_radius`.  Only nodes that host at least one destination are
//! kept, so every later destination lookup is a single hash probe.

use acc_core::NodeId;
use acc_network::{DistanceMap, Network, ShortestPaths};

use crate::access::AccessNode;
use crate::destination::{Destination, DestinationSet};
use crate::AccessResult;

/// Destination access node → network distance from one origin.
///
/// An empty cache means nothing is reachable; an origin with no access node
/// always gets an empty cache.
#[derive(Debug, Clone, Default)]
pub struct DistanceCache {
    source:    Option<NodeId>,
    distances: DistanceMap,
}

impl DistanceCache {
    /// Run one bounded search from `access` and keep the distances to nodes
    /// that host destinations.
    pub fn compute<R: ShortestPaths + ?Sized>(
        access: AccessNode,
        network: &Network,
        router: &R,
        destinations: &DestinationSet,
        max_radius: f64,
    ) -> AccessResult<Self> {
        let Some(source) = access.node() else {
            return Ok(Self::default());
        };
        let mut distances = router.distances_from(network, source, max_radius)?;
        distances.retain(|node, _| destinations.hosts(*node));
        Ok(Self { source: Some(source), distances })
    }

    /// The origin's access node, if it had one.
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// Network distance to `node`; `None` if unreachable within the radius.
    #[inline]
    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.distances.get(&node).copied()
    }

    /// Network distance to a destination; `None` if it is off the network
    /// or out of reach.
    #[inline]
    pub fn distance_to(&self, destination: &Destination) -> Option<f64> {
        destination.access_node().and_then(|n| self.get(n))
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.distances.contains_key(&node)
    }

    /// `(node, distance)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.distances.iter().map(|(&n, &d)| (n, d))
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}
