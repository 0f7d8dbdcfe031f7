//! Origins and their preparation lifecycle.
//!
//! Each origin goes through three steps, in order, exactly once:
//!
//! ```text
//! resolve_access ──▶ compute_distances ──▶ select_destinations
//!  (AccessNode)       (DistanceCache)       (Vec<Reach>)
//! ```
//!
//! Running a step early fails with [`AccessError::Lifecycle`]; running one
//! twice fails with [`AccessError::AlreadyDone`].  An origin owns all of its
//! derived state, so workers can prepare disjoint origins concurrently.

use geo::{Centroid, Geometry};

use acc_core::{AnalysisConfig, DestinationId, OriginId, Point, RegionRule};
use acc_network::{Network, ShortestPaths};

use crate::access::AccessNode;
use crate::cache::DistanceCache;
use crate::destination::{Destination, DestinationSet};
use crate::{AccessError, AccessResult};

/// A destination an origin can reach, with its network distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reach {
    pub destination: DestinationId,
    pub distance:    f64,
}

/// One location accessibility is measured from, typically a grid cell.
#[derive(Clone, Debug)]
pub struct Origin {
    pub id:       OriginId,
    pub centroid: Point,
    pub region:   Option<String>,
    /// Zone geometry, carried through for presentation.
    pub geometry: Option<Geometry<f64>>,

    access:    Option<AccessNode>,
    distances: Option<DistanceCache>,
    reachable: Option<Vec<Reach>>,
}

impl Origin {
    pub fn new(id: OriginId, centroid: Point) -> Self {
        Self {
            id,
            centroid,
            region: None,
            geometry: None,
            access: None,
            distances: None,
            reachable: None,
        }
    }

    /// Origin for a zone; the centroid is taken from the geometry.  Returns
    /// `None` for an empty geometry.
    pub fn from_geometry(id: OriginId, geometry: Geometry<f64>) -> Option<Self> {
        let c = geometry.centroid()?;
        let mut o = Self::new(id, Point::new(c.x(), c.y()));
        o.geometry = Some(geometry);
        Some(o)
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Step 1: snap the centroid to the network.
    pub fn resolve_access(&mut self, network: &Network, search_radius: f64) -> AccessResult<AccessNode> {
        if self.access.is_some() {
            return Err(self.already_done("resolve the access node"));
        }
        let access = AccessNode::resolve(self.centroid, network, search_radius);
        self.access = Some(access);
        Ok(access)
    }

    /// Step 2: one bounded search from the access node.
    pub fn compute_distances<R: ShortestPaths + ?Sized>(
        &mut self,
        network: &Network,
        router: &R,
        destinations: &DestinationSet,
        max_radius: f64,
    ) -> AccessResult<&DistanceCache> {
        let Some(access) = self.access else {
            return Err(self.out_of_order("compute distances", "resolving the access node"));
        };
        if self.distances.is_some() {
            return Err(self.already_done("compute distances"));
        }
        let cache = DistanceCache::compute(access, network, router, destinations, max_radius)?;
        Ok(&*self.distances.insert(cache))
    }

    /// Step 3: keep the destinations present in the distance cache that
    /// pass the region rule, nearest first.
    pub fn select_destinations(
        &mut self,
        destinations: &DestinationSet,
        rule: RegionRule,
    ) -> AccessResult<&[Reach]> {
        let Some(cache) = &self.distances else {
            return Err(self.out_of_order("select destinations", "computing distances"));
        };
        if self.reachable.is_some() {
            return Err(self.already_done("select destinations"));
        }

        let origin_region = self.region.as_deref();
        let mut reach: Vec<Reach> = cache
            .iter()
            .flat_map(|(node, distance)| {
                destinations
                    .at_node(node)
                    .filter(move |d| region_allows(rule, origin_region, d))
                    .map(move |d| Reach { destination: d.id(), distance })
            })
            .collect();
        reach.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.destination.cmp(&b.destination))
        });
        let reach = self.reachable.insert(reach);
        Ok(reach.as_slice())
    }

    /// All three steps with the settings from `config`.
    pub fn prepare<R: ShortestPaths + ?Sized>(
        &mut self,
        network: &Network,
        router: &R,
        destinations: &DestinationSet,
        config: &AnalysisConfig,
    ) -> AccessResult<()> {
        self.resolve_access(network, config.search_radius)?;
        self.compute_distances(network, router, destinations, config.max_radius)?;
        self.select_destinations(destinations, config.region_rule)?;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `None` until step 1 has run.
    pub fn access(&self) -> Option<AccessNode> {
        self.access
    }

    /// `None` until step 2 has run.
    pub fn distances(&self) -> Option<&DistanceCache> {
        self.distances.as_ref()
    }

    /// Reachable destinations, nearest first.  `None` until step 3 has run.
    pub fn reachable(&self) -> Option<&[Reach]> {
        self.reachable.as_deref()
    }

    /// Reachable destinations, or a lifecycle error if step 3 has not run.
    pub fn try_reachable(&self) -> AccessResult<&[Reach]> {
        self.reachable()
            .ok_or_else(|| self.out_of_order("aggregate indices", "selecting destinations"))
    }

    /// Network distance to one destination, ignoring region rules.  `None`
    /// is unreachable, including when either side is off the network.
    pub fn distance_to(&self, destination: &Destination) -> Option<f64> {
        self.distances.as_ref()?.distance_to(destination)
    }

    fn out_of_order(&self, step: &'static str, requires: &'static str) -> AccessError {
        AccessError::Lifecycle { origin: self.id, step, requires }
    }

    fn already_done(&self, step: &'static str) -> AccessError {
        AccessError::AlreadyDone { origin: self.id, step }
    }
}

/// Whether the region rule lets an origin in `origin_region` use `d`.
/// A missing region on either side never satisfies a same-region test.
pub fn region_allows(rule: RegionRule, origin_region: Option<&str>, d: &Destination) -> bool {
    let constrained = match rule {
        RegionRule::Ignore => false,
        RegionRule::FlaggedOnly => d.admin_constrained(),
        RegionRule::AlwaysSameRegion => true,
    };
    if !constrained {
        return true;
    }
    match (origin_region, d.region()) {
        (Some(o), Some(r)) => o == r,
        _ => false,
    }
}
