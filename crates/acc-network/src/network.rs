//! Network representation and builder.
//!
//! # Data layout
//!
//! Edges are undirected.  Each edge is stored once in the `edge_*` arrays
//! (indexed by `EdgeId`) and twice in the **Compressed Sparse Row (CSR)**
//! arc arrays, once per direction.  Given a `NodeId n`, its arcs occupy:
//!
//! ```text
//! arc_to[ node_arc_start[n] .. node_arc_start[n+1] ]
//! ```
//!
//! Iteration over a node's neighbours is a contiguous memory scan, which is
//! what Dijkstra's inner loop wants.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over node positions answers the radius queries
//! used to snap origins and destinations to access nodes.
//!
//! # Sharing
//!
//! A built `Network` is never mutated.  It is `Send + Sync` and is shared by
//! reference across worker threads.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use acc_core::{CoordSystem, EdgeId, NodeId, Point};

use crate::error::{GraphError, NetworkResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index.
#[derive(Clone)]
pub(crate) struct NodeEntry {
    pub(crate) point: [f64; 2],
    pub(crate) id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in coordinate space.  Geographic queries
    /// refine candidates with haversine afterwards.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Undirected weighted graph in CSR format plus a node spatial index.
///
/// Do not construct directly; use [`NetworkBuilder`], [`Network::build`], or
/// [`Topology::into_network`](crate::Topology::into_network).
pub struct Network {
    /// Coordinate system of `node_pos`.
    pub crs: CoordSystem,

    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    // ── CSR arc adjacency ─────────────────────────────────────────────────
    /// Arcs of node `n` are at `node_arc_start[n] .. node_arc_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_arc_start: Vec<u32>,

    /// Head node of each arc.
    pub arc_to: Vec<NodeId>,

    /// Undirected edge each arc belongs to.
    pub arc_edge: Vec<EdgeId>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,

    pub edge_to: Vec<NodeId>,

    /// Length of each edge: coordinate units (planar) or metres (geographic).
    pub edge_weight: Vec<f64>,

    // ── Spatial index ─────────────────────────────────────────────────────
    pub(crate) spatial_idx: RTree<NodeEntry>,
}

impl Network {
    /// A network with no nodes or edges.  Every snap against it yields no
    /// access node.
    pub fn empty(crs: CoordSystem) -> Self {
        Self {
            crs,
            node_pos:       Vec::new(),
            node_arc_start: vec![0],
            arc_to:         Vec::new(),
            arc_edge:       Vec::new(),
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_weight:    Vec::new(),
            spatial_idx:    RTree::new(),
        }
    }

    /// Build a network from explicit nodes and `(from, to, weight)` edges.
    ///
    /// Fails with [`GraphError`] if an edge references an unknown node, has
    /// a negative or non-finite weight, or is a self-loop.
    pub fn build<I>(crs: CoordSystem, nodes: Vec<Point>, edges: I) -> NetworkResult<Network>
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut b = NetworkBuilder::new(crs);
        b.nodes = nodes;
        for (from, to, weight) in edges {
            b.add_edge(from, to, weight);
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.node_pos.get(node.index()).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over `(neighbour, weight, edge)` for every arc leaving `node`.
    ///
    /// # Panics
    /// Panics if `node` is not in the network.
    #[inline]
    pub fn arcs(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64, EdgeId)> + '_ {
        let start = self.node_arc_start[node.index()] as usize;
        let end   = self.node_arc_start[node.index() + 1] as usize;
        (start..end).map(move |a| {
            let edge = self.arc_edge[a];
            (self.arc_to[a], self.edge_weight[edge.index()], edge)
        })
    }

    /// Number of incident edges (parallel edges counted separately).
    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.node_arc_start[node.index()] as usize;
        let end   = self.node_arc_start[node.index() + 1] as usize;
        end - start
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use acc_core::{CoordSystem, Point};
/// use acc_network::NetworkBuilder;
///
/// let mut b = NetworkBuilder::new(CoordSystem::Planar);
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(100.0, 0.0));
/// b.add_edge(a, c, 100.0);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 1);
/// assert_eq!(net.shortest_path_distance(a, c).unwrap(), Some(100.0));
/// ```
pub struct NetworkBuilder {
    crs:       CoordSystem,
    nodes:     Vec<Point>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:   NodeId,
    to:     NodeId,
    weight: f64,
}

impl NetworkBuilder {
    pub fn new(crs: CoordSystem) -> Self {
        Self { crs, nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(crs: CoordSystem, nodes: usize, edges: usize) -> Self {
        Self {
            crs,
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add an undirected edge.  Validation is deferred to [`build`](Self::build).
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> EdgeId {
        let id = EdgeId(self.raw_edges.len() as u32);
        self.raw_edges.push(RawEdge { from, to, weight });
        id
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate and produce a [`Network`].
    ///
    /// Time complexity: O(E) for the CSR arrays + O(N log N) for the R-tree
    /// bulk load, where N = nodes, E = edges.
    pub fn build(self) -> NetworkResult<Network> {
        let node_count = self.nodes.len();

        for (i, p) in self.nodes.iter().enumerate() {
            if !p.is_finite() {
                return Err(GraphError::InvalidPosition(NodeId(i as u32)).into());
            }
        }
        for (i, e) in self.raw_edges.iter().enumerate() {
            for node in [e.from, e.to] {
                if node.index() >= node_count {
                    return Err(GraphError::UnknownNode { edge: i, node }.into());
                }
            }
            if !e.weight.is_finite() || e.weight < 0.0 {
                return Err(GraphError::InvalidWeight { edge: i, weight: e.weight }.into());
            }
            if e.from == e.to {
                return Err(GraphError::SelfLoop { edge: i, node: e.from }.into());
            }
        }

        // CSR row pointer: two arcs per edge, one at each endpoint.
        let mut node_arc_start = vec![0u32; node_count + 1];
        for e in &self.raw_edges {
            node_arc_start[e.from.index() + 1] += 1;
            node_arc_start[e.to.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_arc_start[i] += node_arc_start[i - 1];
        }
        let arc_count = node_arc_start[node_count] as usize;
        debug_assert_eq!(arc_count, self.raw_edges.len() * 2);

        let mut cursor: Vec<u32> = node_arc_start[..node_count].to_vec();
        let mut arc_to   = vec![NodeId(0); arc_count];
        let mut arc_edge = vec![EdgeId(0); arc_count];
        for (i, e) in self.raw_edges.iter().enumerate() {
            let edge = EdgeId(i as u32);
            for (tail, head) in [(e.from, e.to), (e.to, e.from)] {
                let slot = cursor[tail.index()] as usize;
                arc_to[slot] = head;
                arc_edge[slot] = edge;
                cursor[tail.index()] += 1;
            }
        }

        let edge_from:   Vec<NodeId> = self.raw_edges.iter().map(|e| e.from).collect();
        let edge_to:     Vec<NodeId> = self.raw_edges.iter().map(|e| e.to).collect();
        let edge_weight: Vec<f64>    = self.raw_edges.iter().map(|e| e.weight).collect();

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry { point: [p.x, p.y], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(Network {
            crs: self.crs,
            node_pos: self.nodes,
            node_arc_start,
            arc_to,
            arc_edge,
            edge_from,
            edge_to,
            edge_weight,
            spatial_idx,
        })
    }
}
