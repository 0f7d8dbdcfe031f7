//! Access-node resolution: snap a point to its nearest network node.
//!
//! A point with no node inside the search radius has **no access node**.
//! That is an expected outcome (the point lies off the routable mesh), so
//! it is returned as `None` rather than an error, and every distance
//! involving that point is treated as unreachable downstream.

use rstar::AABB;

use acc_core::{CoordSystem, NodeId, Point};

use crate::network::Network;

impl Network {
    /// Every node within `radius` of `point`, with its distance, in no
    /// particular order.
    ///
    /// Distances are planar for `CoordSystem::Planar` and haversine metres
    /// for `CoordSystem::Geographic`.
    pub fn nodes_within(&self, point: Point, radius: f64) -> Vec<(NodeId, f64)> {
        if !point.is_finite() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let query = [point.x, point.y];
        match self.crs {
            CoordSystem::Planar => self
                .spatial_idx
                .locate_within_distance(query, radius * radius)
                .map(|e| (e.id, point.planar_distance(self.node_pos[e.id.index()])))
                .collect(),
            CoordSystem::Geographic => {
                let (dx, dy) = point.search_extent(radius, self.crs);
                let envelope = AABB::from_corners(
                    [point.x - dx, point.y - dy],
                    [point.x + dx, point.y + dy],
                );
                self.spatial_idx
                    .locate_in_envelope(&envelope)
                    .map(|e| (e.id, point.haversine_m(self.node_pos[e.id.index()])))
                    .filter(|&(_, d)| d <= radius)
                    .collect()
            }
        }
    }

    /// The node nearest to `point` among those within `search_radius`.
    ///
    /// Ties are broken by the lowest `NodeId` so results are reproducible.
    /// Returns `None` if no node lies within the radius, or if `point` is not
    /// finite.
    pub fn resolve(&self, point: Point, search_radius: f64) -> Option<NodeId> {
        self.nodes_within(point, search_radius)
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }
}

/// Free-function form of [`Network::resolve`].
#[inline]
pub fn resolve(point: Point, network: &Network, search_radius: f64) -> Option<NodeId> {
    network.resolve(point, search_radius)
}
