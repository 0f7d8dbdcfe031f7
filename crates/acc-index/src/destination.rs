//! Destinations and the per-run destination collection.
//!
//! A [`Destination`] is immutable once built except for its access node,
//! which is assigned exactly once.  [`DestinationSetBuilder`] checks every
//! destination against the category usage table and hands out ids from a
//! run-scoped [`IdSequence`].

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{info, warn};

use acc_core::{CategoryTable, DestinationId, IdSequence, NodeId, Point};
use acc_network::Network;

use crate::access::AccessNode;
use crate::{AccessError, AccessResult};

// ── Destination ───────────────────────────────────────────────────────────────

/// One service location.
#[derive(Clone, Debug, PartialEq)]
pub struct Destination {
    id:                DestinationId,
    category:          String,
    usage:             f64,
    centroid:          Point,
    admin_constrained: bool,
    region:            Option<String>,
    access:            Option<AccessNode>,
}

impl Destination {
    pub fn new(id: DestinationId, category: impl Into<String>, usage: f64, centroid: Point) -> Self {
        Self {
            id,
            category: category.into(),
            usage,
            centroid,
            admin_constrained: false,
            region: None,
            access: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Restrict this destination to origins in its own region.
    pub fn with_admin_constraint(mut self, constrained: bool) -> Self {
        self.admin_constrained = constrained;
        self
    }

    pub fn id(&self) -> DestinationId { self.id }
    pub fn category(&self) -> &str { &self.category }
    pub fn usage(&self) -> f64 { self.usage }
    pub fn centroid(&self) -> Point { self.centroid }
    pub fn admin_constrained(&self) -> bool { self.admin_constrained }
    pub fn region(&self) -> Option<&str> { self.region.as_deref() }

    /// `None` until [`assign_access_node`](Self::assign_access_node) runs.
    pub fn access(&self) -> Option<AccessNode> {
        self.access
    }

    /// The node this destination is reached through, if it was snapped.
    pub fn access_node(&self) -> Option<NodeId> {
        self.access.and_then(AccessNode::node)
    }

    /// Set the access node.  Fails if one was already assigned.
    pub fn assign_access_node(&mut self, access: AccessNode) -> AccessResult<()> {
        if self.access.is_some() {
            return Err(AccessError::AccessNodeAlreadySet(self.id));
        }
        self.access = Some(access);
        Ok(())
    }
}

// ── DestinationSetBuilder ─────────────────────────────────────────────────────

/// Collects destinations for one analysis run.
///
/// # Example
///
/// ```
/// use acc_core::{CategoryTable, Point};
/// use acc_index::DestinationSetBuilder;
///
/// let table = CategoryTable::default_services();
/// let mut b = DestinationSetBuilder::new(&table);
/// let school = b.add("school", Point::new(10.0, 10.0), Some("north")).unwrap();
/// assert!(b.add("casino", Point::new(0.0, 0.0), None).is_err());
///
/// let set = b.build();
/// let d = set.get(school).unwrap();
/// assert_eq!(d.usage(), 0.16);
/// assert!(d.admin_constrained());
/// ```
pub struct DestinationSetBuilder<'a> {
    table: &'a CategoryTable,
    ids:   IdSequence<DestinationId>,
    seen:  FxHashSet<DestinationId>,
    items: Vec<Destination>,
}

impl<'a> DestinationSetBuilder<'a> {
    pub fn new(table: &'a CategoryTable) -> Self {
        Self {
            table,
            ids:   IdSequence::new(),
            seen:  FxHashSet::default(),
            items: Vec::new(),
        }
    }

    /// Add a destination with a generated id.  Usage and admin flag come
    /// from the category table.
    pub fn add(
        &mut self,
        category: &str,
        centroid: Point,
        region: Option<&str>,
    ) -> AccessResult<DestinationId> {
        let mut id = self.ids.next_id();
        while self.seen.contains(&id) {
            id = self.ids.next_id();
        }
        self.add_with_id(id, category, centroid, region)?;
        Ok(id)
    }

    /// Add a destination under a caller-supplied id.
    pub fn add_with_id(
        &mut self,
        id: DestinationId,
        category: &str,
        centroid: Point,
        region: Option<&str>,
    ) -> AccessResult<()> {
        let rule = self.table.rule(category)?;
        let mut d = Destination::new(id, category, rule.usage, centroid)
            .with_admin_constraint(rule.admin_constrained);
        if let Some(r) = region {
            d = d.with_region(r);
        }
        self.push(d)
    }

    /// Add a fully specified destination, e.g. one whose usage weight
    /// differs from the category default.
    pub fn push(&mut self, destination: Destination) -> AccessResult<()> {
        self.table.rule(destination.category())?;
        let usage = destination.usage();
        if !(0.0..=1.0).contains(&usage) {
            return Err(AccessError::InvalidUsage { destination: destination.id(), usage });
        }
        if !self.seen.insert(destination.id()) {
            return Err(AccessError::DuplicateDestination(destination.id()));
        }
        self.items.push(destination);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn build(self) -> DestinationSet {
        let index = self
            .items
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id(), i))
            .collect();
        let mut set = DestinationSet { items: self.items, index, by_node: FxHashMap::default() };
        set.reindex_nodes();
        set
    }
}

// ── DestinationSet ────────────────────────────────────────────────────────────

/// All destinations of a run, indexed by id and by access node.
#[derive(Debug, Default)]
pub struct DestinationSet {
    items:   Vec<Destination>,
    index:   FxHashMap<DestinationId, usize>,
    by_node: FxHashMap<NodeId, Vec<usize>>,
}

impl DestinationSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.items.iter()
    }

    pub fn get(&self, id: DestinationId) -> Option<&Destination> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    /// Snap every destination that has no access node yet.  Returns how
    /// many ended up off the network.
    pub fn resolve_access(&mut self, network: &Network, search_radius: f64) -> AccessResult<usize> {
        for d in &mut self.items {
            if d.access().is_none() {
                d.assign_access_node(AccessNode::resolve(d.centroid(), network, search_radius))?;
            }
        }
        self.reindex_nodes();

        let off = self
            .items
            .iter()
            .filter(|d| d.access() == Some(AccessNode::OffNetwork))
            .count();
        if off > 0 {
            warn!(off_network = off, total = self.items.len(), "destinations without an access node");
        }
        info!(
            destinations = self.items.len(),
            access_nodes = self.by_node.len(),
            "resolved destination access nodes"
        );
        Ok(off)
    }

    /// Destinations reached through `node`.
    pub fn at_node(&self, node: NodeId) -> impl Iterator<Item = &Destination> {
        self.by_node
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&i| &self.items[i])
    }

    /// `true` if at least one destination is reached through `node`.
    #[inline]
    pub fn hosts(&self, node: NodeId) -> bool {
        self.by_node.contains_key(&node)
    }

    /// Distinct access nodes of all snapped destinations.
    pub fn access_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_node.keys().copied()
    }

    fn reindex_nodes(&mut self) {
        self.by_node.clear();
        for (i, d) in self.items.iter().enumerate() {
            if let Some(n) = d.access_node() {
                self.by_node.entry(n).or_default().push(i);
            }
        }
    }
}
