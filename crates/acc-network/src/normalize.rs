//! Geometry normalization: raw line features → node/edge topology.
//!
//! # Pipeline
//!
//! 1. **Validate** every input line (≥ 2 finite coordinates, non-zero length).
//! 2. **Node** the arrangement: every pair of segments that cross, touch, or
//!    overlap is split at the shared point(s).  Candidate pairs come from an
//!    R-tree over segment envelopes.
//! 3. **Cut** each input line at its split points into pieces; each piece is
//!    a maximal run that crosses nothing.
//! 4. **Snap** piece endpoints to nodes.  Endpoints within `tolerance` of an
//!    existing node reuse it (grid hashing, so floating-point noise does not
//!    fragment the graph).
//! 5. **Merge** geometrically identical pieces produced by overlapping input
//!    lines, and drop self-loops.
//! 6. Optionally **drop isolated edges**: edges whose endpoints are both
//!    shared with no other edge.
//!
//! The result is a [`Topology`], which [`Topology::into_network`] hands to
//! the graph builder.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Euclidean, Length, Line, LineString};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use acc_core::geo::METRES_PER_DEGREE;
use acc_core::{AnalysisConfig, CoordSystem, NodeId, Point};

use crate::error::{GeometryError, NetworkResult};
use crate::network::{Network, NetworkBuilder};

// ── Options and output ────────────────────────────────────────────────────────

/// Settings for [`normalize`].
#[derive(Clone, Debug)]
pub struct NormalizeOptions {
    pub crs: CoordSystem,
    /// Endpoint merge distance: coordinate units for `Planar`, metres for
    /// `Geographic`.
    pub tolerance: f64,
    /// Drop edges that share no endpoint with any other edge.
    pub drop_isolated: bool,
}

impl NormalizeOptions {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            crs:           config.crs,
            tolerance:     config.snap_tolerance,
            drop_isolated: config.drop_isolated,
        }
    }
}

impl NormalizeOptions {
    /// Merge distance in coordinate units.
    ///
    /// Geographic tolerances are converted with the length of a degree of
    /// latitude.  A degree of longitude is never longer, so no merge spans
    /// more than `tolerance` metres.
    pub fn coord_tolerance(&self) -> f64 {
        let tol = self.tolerance.max(0.0);
        match self.crs {
            CoordSystem::Planar => tol,
            CoordSystem::Geographic => tol / METRES_PER_DEGREE,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { crs: CoordSystem::Planar, tolerance: 0.1, drop_isolated: false }
    }
}

/// One edge-to-be: endpoints, length, and the piece geometry.
#[derive(Clone, Debug)]
pub struct TopoEdge {
    pub from:     NodeId,
    pub to:       NodeId,
    pub weight:   f64,
    pub geometry: LineString<f64>,
}

/// Normalized node set and edge list.
#[derive(Clone, Debug)]
pub struct Topology {
    pub crs:   CoordSystem,
    pub nodes: Vec<Point>,
    pub edges: Vec<TopoEdge>,
}

impl Topology {
    /// Hand the topology to [`NetworkBuilder`].
    pub fn into_network(self) -> NetworkResult<Network> {
        let mut b = NetworkBuilder::with_capacity(self.crs, self.nodes.len(), self.edges.len());
        for p in self.nodes {
            b.add_node(p);
        }
        for e in self.edges {
            b.add_edge(e.from, e.to, e.weight);
        }
        b.build()
    }
}

impl Network {
    /// Normalize `lines` and build a network from the result.
    pub fn from_lines(lines: &[LineString<f64>], options: &NormalizeOptions) -> NetworkResult<Network> {
        normalize(lines, options)?.into_network()
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Merge raw line features into a node/edge topology.
///
/// Fails with [`GeometryError`] on empty input, lines with fewer than two
/// coordinates, non-finite coordinates, or zero-length lines.  Bad input is
/// never dropped silently.
pub fn normalize(lines: &[LineString<f64>], options: &NormalizeOptions) -> NetworkResult<Topology> {
    validate(lines)?;

    let tol = options.coord_tolerance();
    let segments = explode(lines);
    let splits = find_splits(&segments, tol);
    let pieces = cut_pieces(lines.len(), &segments, &splits, tol);

    let mut grid = NodeGrid::new(tol);
    let mut seen: FxHashSet<Vec<(i64, i64)>> = FxHashSet::default();
    let mut edges: Vec<TopoEdge> = Vec::with_capacity(pieces.len());
    let mut duplicates = 0usize;
    let mut self_loops = 0usize;

    for piece in pieces {
        let key = grid.shape_key(&piece);
        if !seen.insert(key) {
            duplicates += 1;
            continue;
        }
        let (Some(&first), Some(&last)) = (piece.first(), piece.last()) else {
            continue;
        };
        let from = grid.snap(to_point(first));
        let to = grid.snap(to_point(last));
        if from == to {
            self_loops += 1;
            continue;
        }
        let geometry = LineString::new(piece);
        let weight = line_length(&geometry, options.crs);
        edges.push(TopoEdge { from, to, weight, geometry });
    }

    let mut isolated = 0usize;
    if options.drop_isolated {
        let mut degree = vec![0u32; grid.points.len()];
        for e in &edges {
            degree[e.from.index()] += 1;
            degree[e.to.index()] += 1;
        }
        let before = edges.len();
        edges.retain(|e| degree[e.from.index()] > 1 || degree[e.to.index()] > 1);
        isolated = before - edges.len();
    }

    if duplicates > 0 || self_loops > 0 || isolated > 0 {
        debug!(duplicates, self_loops, isolated, "discarded pieces during normalization");
    }

    let topology = compact(options.crs, grid.points, edges);
    info!(
        lines = lines.len(),
        segments = segments.len(),
        nodes = topology.nodes.len(),
        edges = topology.edges.len(),
        "normalized line geometries"
    );
    Ok(topology)
}

// ── Validation ────────────────────────────────────────────────────────────────

fn validate(lines: &[LineString<f64>]) -> Result<(), GeometryError> {
    if lines.is_empty() {
        return Err(GeometryError::Empty);
    }
    for (line, ls) in lines.iter().enumerate() {
        let count = ls.0.len();
        if count < 2 {
            return Err(GeometryError::TooFewCoordinates { line, count });
        }
        if let Some(vertex) = ls.0.iter().position(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryError::NonFinite { line, vertex });
        }
        if ls.0.windows(2).all(|w| w[0] == w[1]) {
            return Err(GeometryError::ZeroLength { line });
        }
    }
    Ok(())
}

// ── Segment explosion and noding ──────────────────────────────────────────────

struct Segment {
    line:    usize,
    /// Position among the non-degenerate segments of its line.
    ordinal: usize,
    geom:    Line<f64>,
}

/// Break every line into its non-degenerate two-point segments, in order.
fn explode(lines: &[LineString<f64>]) -> Vec<Segment> {
    let mut out = Vec::new();
    for (line, ls) in lines.iter().enumerate() {
        let mut ordinal = 0;
        for geom in ls.lines() {
            if geom.start == geom.end {
                continue;
            }
            out.push(Segment { line, ordinal, geom });
            ordinal += 1;
        }
    }
    out
}

/// Parameter `t ∈ [0, 1]` of the projection of `p` onto `seg`.
fn param(seg: &Line<f64>, p: Coord<f64>) -> f64 {
    let d = seg.delta();
    let len2 = d.x * d.x + d.y * d.y;
    let t = ((p.x - seg.start.x) * d.x + (p.y - seg.start.y) * d.y) / len2;
    t.clamp(0.0, 1.0)
}

/// A cut point on a segment: its parameter along the segment and the exact
/// intersection coordinate, shared by both segments involved.
type Split = (f64, Coord<f64>);

/// Split points for every segment, from all pairwise intersections.
fn find_splits(segments: &[Segment], tol: f64) -> Vec<Vec<Split>> {
    let rects: Vec<GeomWithData<Rectangle<[f64; 2]>, usize>> = segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let (min, max) = bounds(&s.geom, 0.0);
            GeomWithData::new(Rectangle::from_corners(min, max), i)
        })
        .collect();
    let tree = RTree::bulk_load(rects);

    let mut splits: Vec<Vec<Split>> = vec![Vec::new(); segments.len()];
    for (i, a) in segments.iter().enumerate() {
        let (min, max) = bounds(&a.geom, tol);
        let envelope = AABB::from_corners(min, max);
        for cand in tree.locate_in_envelope_intersecting(&envelope) {
            let j = cand.data;
            if j <= i {
                continue;
            }
            let b = &segments[j];
            // Consecutive segments of one line always share a vertex; that is
            // not a crossing.
            if a.line == b.line && a.ordinal.abs_diff(b.ordinal) == 1 {
                continue;
            }
            let points: Vec<Coord<f64>> = match line_intersection(a.geom, b.geom) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => vec![intersection],
                Some(LineIntersection::Collinear { intersection }) => {
                    vec![intersection.start, intersection.end]
                }
                None => continue,
            };
            for p in points {
                splits[i].push((param(&a.geom, p), p));
                splits[j].push((param(&b.geom, p), p));
            }
        }
    }
    splits
}

fn bounds(seg: &Line<f64>, pad: f64) -> ([f64; 2], [f64; 2]) {
    (
        [seg.start.x.min(seg.end.x) - pad, seg.start.y.min(seg.end.y) - pad],
        [seg.start.x.max(seg.end.x) + pad, seg.start.y.max(seg.end.y) + pad],
    )
}

// ── Cutting lines into pieces ─────────────────────────────────────────────────

/// Cut each line at its split points.  Returns the coordinate sequence of
/// every piece, in input order.
fn cut_pieces(
    line_count: usize,
    segments: &[Segment],
    splits: &[Vec<Split>],
    tol: f64,
) -> Vec<Vec<Coord<f64>>> {
    let mut by_line: Vec<Vec<usize>> = vec![Vec::new(); line_count];
    for (i, s) in segments.iter().enumerate() {
        by_line[s.line].push(i);
    }

    let mut pieces = Vec::new();
    for seg_ids in by_line {
        let Some(&first) = seg_ids.first() else { continue };
        let mut piece: Vec<Coord<f64>> = vec![segments[first].geom.start];

        for &s in &seg_ids {
            let geom = segments[s].geom;
            let mut cuts = splits[s].clone();
            cuts.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut break_at_start = false;
            let mut break_at_end = false;
            let mut interior: Vec<Coord<f64>> = Vec::new();
            for (_, p) in cuts {
                if distance(p, geom.start) <= tol {
                    break_at_start = true;
                } else if distance(p, geom.end) <= tol {
                    break_at_end = true;
                } else if interior.last().is_none_or(|&q| distance(p, q) > tol) {
                    interior.push(p);
                }
            }

            if break_at_start {
                flush(&mut pieces, &mut piece);
            }
            for p in interior {
                piece.push(p);
                flush(&mut pieces, &mut piece);
            }
            piece.push(geom.end);
            if break_at_end {
                flush(&mut pieces, &mut piece);
            }
        }
        if piece.len() >= 2 {
            pieces.push(piece);
        }
    }
    pieces
}

/// Close the current piece (if it has length) and start a new one at its
/// last coordinate.
fn flush(pieces: &mut Vec<Vec<Coord<f64>>>, piece: &mut Vec<Coord<f64>>) {
    let Some(&last) = piece.last() else { return };
    if piece.len() >= 2 {
        pieces.push(std::mem::replace(piece, vec![last]));
    } else {
        *piece = vec![last];
    }
}

#[inline]
fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[inline]
fn to_point(c: Coord<f64>) -> Point {
    Point::new(c.x, c.y)
}

fn line_length(ls: &LineString<f64>, crs: CoordSystem) -> f64 {
    match crs {
        CoordSystem::Planar => Euclidean.length(ls),
        CoordSystem::Geographic => ls
            .lines()
            .map(|l| to_point(l.start).haversine_m(to_point(l.end)))
            .sum(),
    }
}

// ── Tolerance-based node snapping ─────────────────────────────────────────────

/// Grid hash of node positions with cell size = tolerance.  A lookup checks
/// the 3×3 block of cells around the query point, which covers every node
/// within one tolerance.
struct NodeGrid {
    tol:    f64,
    cell:   f64,
    cells:  FxHashMap<(i64, i64), Vec<NodeId>>,
    points: Vec<Point>,
}

impl NodeGrid {
    fn new(tol: f64) -> Self {
        Self { tol, cell: tol, cells: FxHashMap::default(), points: Vec::new() }
    }

    /// Cell of a coordinate.  With zero tolerance only exact equality merges,
    /// so the key is the coordinate's bit pattern (`+ 0.0` folds `-0.0`).
    #[inline]
    fn key(&self, x: f64, y: f64) -> (i64, i64) {
        if self.tol > 0.0 {
            ((x / self.cell).floor() as i64, (y / self.cell).floor() as i64)
        } else {
            ((x + 0.0).to_bits() as i64, (y + 0.0).to_bits() as i64)
        }
    }

    /// Return the node within tolerance of `p` (closest, lowest id on ties),
    /// creating one if none exists.
    fn snap(&mut self, p: Point) -> NodeId {
        let (cx, cy) = self.key(p.x, p.y);
        let mut best: Option<(f64, NodeId)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.cells.get(&(cx + dx, cy + dy)) else { continue };
                for &id in ids {
                    let d = p.planar_distance(self.points[id.index()]);
                    if d <= self.tol && best.is_none_or(|(bd, bid)| d < bd || (d == bd && id < bid)) {
                        best = Some((d, id));
                    }
                }
            }
        }
        if let Some((_, id)) = best {
            return id;
        }
        let id = NodeId(self.points.len() as u32);
        self.points.push(p);
        self.cells.entry((cx, cy)).or_default().push(id);
        id
    }

    /// Direction-independent key of a piece's quantized vertex sequence.
    /// Identical keys mean the same geometry came from overlapping lines.
    fn shape_key(&self, piece: &[Coord<f64>]) -> Vec<(i64, i64)> {
        let forward: Vec<(i64, i64)> = piece.iter().map(|c| self.key(c.x, c.y)).collect();
        let mut backward = forward.clone();
        backward.reverse();
        forward.min(backward)
    }
}

// ── Compaction ────────────────────────────────────────────────────────────────

/// Drop nodes no edge references and renumber the rest densely, preserving
/// creation order.
fn compact(crs: CoordSystem, points: Vec<Point>, mut edges: Vec<TopoEdge>) -> Topology {
    let mut remap: Vec<Option<NodeId>> = vec![None; points.len()];
    for e in &edges {
        remap[e.from.index()] = Some(e.from);
        remap[e.to.index()] = Some(e.to);
    }

    let mut nodes = Vec::with_capacity(points.len());
    for (slot, p) in remap.iter_mut().zip(points) {
        if slot.is_some() {
            *slot = Some(NodeId(nodes.len() as u32));
            nodes.push(p);
        }
    }

    for e in &mut edges {
        // Every endpoint was marked above.
        if let (Some(from), Some(to)) = (remap[e.from.index()], remap[e.to.index()]) {
            e.from = from;
            e.to = to;
        }
    }
    Topology { crs, nodes, edges }
}
