//! Unit tests for acc-network.

#[cfg(test)]
mod helpers {
    use acc_core::{CoordSystem, NodeId, Point};

    use crate::{Network, NetworkBuilder};

    /// 100 m square, nodes counter-clockwise from the origin:
    ///
    /// ```text
    ///  3 ──── 2
    ///  │      │
    ///  0 ──── 1
    /// ```
    pub fn square() -> Network {
        let mut b = NetworkBuilder::new(CoordSystem::Planar);
        let n: Vec<NodeId> = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]
            .into_iter()
            .map(|(x, y)| b.add_node(Point::new(x, y)))
            .collect();
        for i in 0..4 {
            b.add_edge(n[i], n[(i + 1) % 4], 100.0);
        }
        b.build().unwrap()
    }

    /// Two components: 0 ─ 1 and 2 ─ 3.
    pub fn split_pair() -> Network {
        Network::build(
            CoordSystem::Planar,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(1_000.0, 0.0),
                Point::new(1_010.0, 0.0),
            ],
            [(NodeId(0), NodeId(1), 10.0), (NodeId(2), NodeId(3), 10.0)],
        )
        .unwrap()
    }

    /// Unconnected `side × side` lattice of nodes with the given spacing.
    pub fn lattice(side: u32, spacing: f64) -> Network {
        let mut b = NetworkBuilder::new(CoordSystem::Planar);
        for i in 0..side {
            for j in 0..side {
                b.add_node(Point::new(i as f64 * spacing, j as f64 * spacing));
            }
        }
        b.build().unwrap()
    }
}

// ── Graph construction ────────────────────────────────────────────────────────

#[cfg(test)]
mod build {
    use acc_core::{CoordSystem, NodeId, Point};

    use super::helpers::square;
    use crate::{GraphError, Network, NetworkBuilder, NetworkError};

    #[test]
    fn csr_layout() {
        let net = square();
        assert_eq!(net.node_count(), 4);
        assert_eq!(net.edge_count(), 4);
        assert_eq!(net.arc_to.len(), 8);
        for n in 0..4 {
            assert_eq!(net.degree(NodeId(n)), 2);
        }
        let mut nbrs: Vec<NodeId> = net.arcs(NodeId(0)).map(|(n, _, _)| n).collect();
        nbrs.sort();
        assert_eq!(nbrs, vec![NodeId(1), NodeId(3)]);
    }

    #[test]
    fn arcs_share_edge_id_both_ways() {
        let net = square();
        let (_, w, e) = net.arcs(NodeId(0)).find(|(n, _, _)| *n == NodeId(1)).unwrap();
        let (_, w2, e2) = net.arcs(NodeId(1)).find(|(n, _, _)| *n == NodeId(0)).unwrap();
        assert_eq!(e, e2);
        assert_eq!(w, w2);
    }

    #[test]
    fn empty_network() {
        let net = Network::empty(CoordSystem::Planar);
        assert!(net.is_empty());
        assert_eq!(net.resolve(Point::new(0.0, 0.0), 1e9), None);
    }

    #[test]
    fn unknown_node_rejected() {
        let err = Network::build(
            CoordSystem::Planar,
            vec![Point::new(0.0, 0.0)],
            [(NodeId(0), NodeId(5), 1.0)],
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            NetworkError::Graph(GraphError::UnknownNode { edge: 0, node: NodeId(5) })
        ));
    }

    #[test]
    fn invalid_weight_rejected() {
        for w in [-1.0, f64::NAN, f64::INFINITY] {
            let mut b = NetworkBuilder::new(CoordSystem::Planar);
            let a = b.add_node(Point::new(0.0, 0.0));
            let c = b.add_node(Point::new(1.0, 0.0));
            b.add_edge(a, c, w);
            assert!(
                matches!(b.build(), Err(NetworkError::Graph(GraphError::InvalidWeight { .. }))),
                "weight {w} accepted"
            );
        }
    }

    #[test]
    fn self_loop_rejected() {
        let mut b = NetworkBuilder::new(CoordSystem::Planar);
        let a = b.add_node(Point::new(0.0, 0.0));
        b.add_edge(a, a, 1.0);
        assert!(matches!(b.build(), Err(NetworkError::Graph(GraphError::SelfLoop { .. }))));
    }

    #[test]
    fn non_finite_position_rejected() {
        let mut b = NetworkBuilder::new(CoordSystem::Planar);
        b.add_node(Point::new(f64::NAN, 0.0));
        assert!(matches!(
            b.build(),
            Err(NetworkError::Graph(GraphError::InvalidPosition(NodeId(0))))
        ));
    }

    #[test]
    fn zero_weight_allowed() {
        let mut b = NetworkBuilder::new(CoordSystem::Planar);
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(0.0, 0.0));
        b.add_edge(a, c, 0.0);
        let net = b.build().unwrap();
        assert_eq!(net.shortest_path_distance(a, c).unwrap(), Some(0.0));
    }
}

// ── Shortest paths ────────────────────────────────────────────────────────────

#[cfg(test)]
mod shortest_paths {
    use acc_core::{EdgeId, NodeId};

    use super::helpers::{split_pair, square};
    use crate::{Dijkstra, NetworkError, ShortestPaths};

    #[test]
    fn opposite_corner() {
        let net = square();
        assert_eq!(net.shortest_path_distance(NodeId(0), NodeId(2)).unwrap(), Some(200.0));
        assert_eq!(net.shortest_path_distance(NodeId(0), NodeId(3)).unwrap(), Some(100.0));
    }

    #[test]
    fn same_node_is_zero() {
        let net = square();
        assert_eq!(net.shortest_path_distance(NodeId(2), NodeId(2)).unwrap(), Some(0.0));
    }

    #[test]
    fn symmetric() {
        let net = square();
        for a in 0..4 {
            for b in 0..4 {
                let ab = Dijkstra.distance(&net, NodeId(a), NodeId(b)).unwrap();
                let ba = Dijkstra.distance(&net, NodeId(b), NodeId(a)).unwrap();
                assert_eq!(ab, ba);
            }
        }
    }

    #[test]
    fn disconnected_is_none() {
        let net = split_pair();
        assert_eq!(net.shortest_path_distance(NodeId(0), NodeId(3)).unwrap(), None);
        assert_eq!(net.shortest_path(NodeId(0), NodeId(3)).unwrap(), None);
    }

    #[test]
    fn unknown_node_is_error() {
        let net = square();
        assert!(matches!(
            net.shortest_path_distance(NodeId(0), NodeId(9)),
            Err(NetworkError::NodeNotFound(NodeId(9)))
        ));
        assert!(net.shortest_path_distances_from(NodeId(9), 10.0).is_err());
    }

    #[test]
    fn bounded_search_respects_radius() {
        let net = square();
        let within = net.shortest_path_distances_from(NodeId(0), 150.0).unwrap();
        assert_eq!(within.len(), 3);
        assert_eq!(within[&NodeId(0)], 0.0);
        assert_eq!(within[&NodeId(1)], 100.0);
        assert_eq!(within[&NodeId(3)], 100.0);
        assert!(!within.contains_key(&NodeId(2)));
    }

    #[test]
    fn bounded_search_includes_boundary() {
        let net = square();
        let within = net.shortest_path_distances_from(NodeId(0), 200.0).unwrap();
        assert_eq!(within.len(), 4);
        assert_eq!(within[&NodeId(2)], 200.0);
    }

    #[test]
    fn bounded_search_agrees_with_point_queries() {
        let net = square();
        let all = net.shortest_path_distances_from(NodeId(1), f64::INFINITY).unwrap();
        for n in 0..4 {
            let d = net.shortest_path_distance(NodeId(1), NodeId(n)).unwrap();
            assert_eq!(all.get(&NodeId(n)).copied(), d);
        }
    }

    #[test]
    fn negative_radius_settles_nothing() {
        let net = square();
        assert!(net.shortest_path_distances_from(NodeId(0), -1.0).unwrap().is_empty());
    }

    #[test]
    fn disconnected_component_absent_from_map() {
        let net = split_pair();
        let all = net.shortest_path_distances_from(NodeId(0), f64::INFINITY).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn route_reconstruction() {
        let net = square();
        let route = net.shortest_path(NodeId(0), NodeId(1)).unwrap().unwrap();
        assert_eq!(route.nodes, vec![NodeId(0), NodeId(1)]);
        assert_eq!(route.edges, vec![EdgeId(0)]);
        assert_eq!(route.distance, 100.0);

        let long = net.shortest_path(NodeId(0), NodeId(2)).unwrap().unwrap();
        assert_eq!(long.nodes.len(), 3);
        assert_eq!(long.edges.len(), 2);
        assert_eq!(long.distance, 200.0);
        let total: f64 = long.edges.iter().map(|e| net.edge_weight[e.index()]).sum();
        assert_eq!(total, long.distance);

        let line = long.to_line_string(&net);
        assert_eq!(line.0.len(), 3);
    }

    #[test]
    fn trivial_route() {
        let net = square();
        let r = net.shortest_path(NodeId(3), NodeId(3)).unwrap().unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.nodes, vec![NodeId(3)]);
        assert_eq!(r.distance, 0.0);
    }
}

// ── Access-node resolution ────────────────────────────────────────────────────

#[cfg(test)]
mod resolve {
    use acc_core::{CoordSystem, NodeId, Point};

    use super::helpers::{lattice, square};
    use crate::{resolve, Network};

    #[test]
    fn nearest_within_radius() {
        let net = square();
        assert_eq!(net.resolve(Point::new(10.0, 5.0), 50.0), Some(NodeId(0)));
        assert_eq!(net.resolve(Point::new(95.0, 90.0), 50.0), Some(NodeId(2)));
    }

    #[test]
    fn none_outside_radius() {
        let net = square();
        assert_eq!(net.resolve(Point::new(50.0, 50.0), 20.0), None);
        assert_eq!(resolve(Point::new(-500.0, 0.0), &net, 250.0), None);
    }

    #[test]
    fn radius_is_inclusive() {
        let net = square();
        assert_eq!(net.resolve(Point::new(-30.0, 0.0), 30.0), Some(NodeId(0)));
    }

    #[test]
    fn tie_breaks_to_lowest_id() {
        let net = square();
        // Equidistant from nodes 0 and 1.
        assert_eq!(net.resolve(Point::new(50.0, 0.0), 60.0), Some(NodeId(0)));
    }

    #[test]
    fn non_finite_point_has_no_access_node() {
        let net = square();
        assert_eq!(net.resolve(Point::new(f64::NAN, 0.0), 1e9), None);
    }

    #[test]
    fn matches_brute_force() {
        let net = lattice(12, 37.0);
        let radius = 30.0;
        for k in 0..200u32 {
            // Deterministic scatter over and slightly beyond the lattice.
            let q = Point::new(
                ((k * 7919) % 4_700) as f64 / 10.0 - 20.0,
                ((k * 104_729) % 4_700) as f64 / 10.0 - 20.0,
            );
            let expected = net
                .node_pos
                .iter()
                .enumerate()
                .map(|(i, &p)| (NodeId(i as u32), q.planar_distance(p)))
                .filter(|&(_, d)| d <= radius)
                .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
                .map(|(id, _)| id);
            assert_eq!(net.resolve(q, radius), expected, "query {q:?}");
        }
    }

    #[test]
    fn nodes_within_reports_distances() {
        let net = square();
        let mut hits = net.nodes_within(Point::new(0.0, 0.0), 100.0);
        hits.sort_by_key(|&(id, _)| id);
        assert_eq!(hits, vec![(NodeId(0), 0.0), (NodeId(1), 100.0), (NodeId(3), 100.0)]);
    }

    #[test]
    fn geographic_radius_in_metres() {
        // Two nodes ~111 m apart along a meridian.
        let net = Network::build(
            CoordSystem::Geographic,
            vec![Point::new(24.94, 60.170), Point::new(24.94, 60.171)],
            [(NodeId(0), NodeId(1), 111.0)],
        )
        .unwrap();
        // ~44.5 m from node 0, ~66.7 m from node 1.
        let q = Point::new(24.94, 60.1704);
        assert!(net.resolve(q, 40.0).is_none());
        assert_eq!(net.resolve(q, 50.0), Some(NodeId(0)));
        assert_eq!(net.nodes_within(q, 50.0).len(), 1);
        assert_eq!(net.resolve(q, 70.0), Some(NodeId(0)));
        assert_eq!(net.nodes_within(q, 70.0).len(), 2);
    }
}

// ── Geometry normalization ────────────────────────────────────────────────────

#[cfg(test)]
mod normalize {
    use acc_core::{AnalysisConfig, CoordSystem, NodeId, Point};
    use geo::{line_string, LineString};

    use crate::{normalize, GeometryError, Network, NetworkError, NormalizeOptions};

    fn opts() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    fn geometry_err(lines: &[LineString<f64>]) -> GeometryError {
        match normalize(lines, &opts()) {
            Err(NetworkError::Geometry(e)) => e,
            other => panic!("expected geometry error, got {other:?}"),
        }
    }

    #[test]
    fn crossing_lines_split_at_intersection() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 5.0, y: -5.0), (x: 5.0, y: 5.0)],
        ];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.edges.len(), 4);
        assert_eq!(topo.nodes.len(), 5);
        for e in &topo.edges {
            assert!((e.weight - 5.0).abs() < 1e-9);
        }

        let net = topo.into_network().unwrap();
        let centre = net.resolve(Point::new(5.0, 0.0), 0.01).unwrap();
        assert_eq!(net.degree(centre), 4);
        let west = net.resolve(Point::new(0.0, 0.0), 0.01).unwrap();
        let north = net.resolve(Point::new(5.0, 5.0), 0.01).unwrap();
        let d = net.shortest_path_distance(west, north).unwrap().unwrap();
        assert!((d - 10.0).abs() < 1e-9);
    }

    #[test]
    fn touching_endpoints_share_a_node() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.0, y: 0.0), (x: 10.0, y: 10.0)],
        ];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.nodes.len(), 3);
        assert_eq!(topo.edges.len(), 2);
    }

    #[test]
    fn t_junction_splits_through_line() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 20.0, y: 0.0)],
            line_string![(x: 8.0, y: 0.0), (x: 8.0, y: 10.0)],
        ];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.edges.len(), 3);
        assert_eq!(topo.nodes.len(), 4);
    }

    #[test]
    fn endpoints_within_tolerance_merge() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.04, y: 0.03), (x: 20.0, y: 0.0)],
        ];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.nodes.len(), 3);
        let net = topo.into_network().unwrap();
        let a = net.resolve(Point::new(0.0, 0.0), 0.01).unwrap();
        let b = net.resolve(Point::new(20.0, 0.0), 0.01).unwrap();
        assert!(net.shortest_path_distance(a, b).unwrap().is_some());
    }

    #[test]
    fn endpoints_beyond_tolerance_stay_apart() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.5, y: 0.0), (x: 20.0, y: 0.0)],
        ];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.nodes.len(), 4);
    }

    #[test]
    fn duplicate_lines_merge() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.0, y: 0.0), (x: 0.0, y: 0.0)],
        ];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.edges.len(), 1);
        assert_eq!(topo.nodes.len(), 2);
    }

    #[test]
    fn partial_overlap_split_and_merged() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 5.0, y: 0.0), (x: 15.0, y: 0.0)],
        ];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.edges.len(), 3);
        let total: f64 = topo.edges.iter().map(|e| e.weight).sum();
        assert!((total - 15.0).abs() < 1e-9);
    }

    #[test]
    fn closed_ring_without_crossings_is_dropped_as_self_loop() {
        let lines = vec![line_string![
            (x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 0.0)
        ]];
        let topo = normalize(&lines, &opts()).unwrap();
        assert!(topo.edges.is_empty());
    }

    #[test]
    fn isolated_line_dropped_on_request() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 5.0, y: -5.0), (x: 5.0, y: 5.0)],
            line_string![(x: 100.0, y: 100.0), (x: 110.0, y: 100.0)],
        ];
        let keep = normalize(&lines, &opts()).unwrap();
        assert_eq!(keep.edges.len(), 5);

        let drop = normalize(&lines, &NormalizeOptions { drop_isolated: true, ..opts() }).unwrap();
        assert_eq!(drop.edges.len(), 4);
        assert_eq!(drop.nodes.len(), 5);
        for e in &drop.edges {
            assert!(e.from.index() < drop.nodes.len() && e.to.index() < drop.nodes.len());
        }
    }

    #[test]
    fn polyline_keeps_interior_vertices() {
        let lines = vec![line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 6.0, y: 0.0)]];
        let topo = normalize(&lines, &opts()).unwrap();
        assert_eq!(topo.edges.len(), 1);
        assert_eq!(topo.edges[0].geometry.0.len(), 3);
        assert!((topo.edges[0].weight - 10.0).abs() < 1e-9);
    }

    #[test]
    fn geographic_weights_in_metres() {
        let lines = vec![line_string![(x: 24.94, y: 60.0), (x: 24.94, y: 60.01)]];
        let options = NormalizeOptions { crs: CoordSystem::Geographic, tolerance: 1e-6, ..opts() };
        let net = Network::from_lines(&lines, &options).unwrap();
        let w = net.edge_weight[0];
        assert!((w - 1_111.95).abs() < 1.0, "got {w}");
        assert_eq!(net.shortest_path_distance(NodeId(0), NodeId(1)).unwrap(), Some(w));
    }

    /// 11 × 11 street grid with 0.001° spacing, supplied as full-length lines.
    fn geographic_grid() -> Vec<LineString<f64>> {
        let (x0, y0, step) = (24.9, 60.1, 0.001);
        (0..=10)
            .flat_map(|i| {
                let k = i as f64 * step;
                [
                    line_string![(x: x0, y: y0 + k), (x: x0 + 10.0 * step, y: y0 + k)],
                    line_string![(x: x0 + k, y: y0), (x: x0 + k, y: y0 + 10.0 * step)],
                ]
            })
            .collect()
    }

    #[test]
    fn geographic_tolerance_in_metres() {
        let config = AnalysisConfig { crs: CoordSystem::Geographic, ..AnalysisConfig::default() };
        let options = NormalizeOptions::from_config(&config);
        assert!((options.coord_tolerance() - 0.1 / 111_320.0).abs() < 1e-12);

        let net = Network::from_lines(&geographic_grid(), &options).unwrap();
        assert_eq!(net.node_count(), 121);
        assert_eq!(net.edge_count(), 220);
    }

    #[test]
    fn geographic_tolerance_merges_nearby_endpoints() {
        // Second line starts ~0.5 m north of the first line's end.
        let lines = vec![
            line_string![(x: 24.9, y: 60.1), (x: 24.901, y: 60.1)],
            line_string![(x: 24.901, y: 60.100_004_5), (x: 24.902, y: 60.100_004_5)],
        ];
        let merged = NormalizeOptions { crs: CoordSystem::Geographic, tolerance: 1.0, ..opts() };
        assert_eq!(normalize(&lines, &merged).unwrap().nodes.len(), 3);

        let kept = NormalizeOptions { crs: CoordSystem::Geographic, tolerance: 0.1, ..opts() };
        assert_eq!(normalize(&lines, &kept).unwrap().nodes.len(), 4);
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(geometry_err(&[]), GeometryError::Empty);
    }

    #[test]
    fn single_coordinate_rejected() {
        let lines = vec![LineString::from(vec![(1.0, 1.0)])];
        assert_eq!(geometry_err(&lines), GeometryError::TooFewCoordinates { line: 0, count: 1 });
    }

    #[test]
    fn non_finite_rejected() {
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            line_string![(x: 0.0, y: 0.0), (x: f64::NAN, y: 1.0)],
        ];
        assert_eq!(geometry_err(&lines), GeometryError::NonFinite { line: 1, vertex: 1 });
    }

    #[test]
    fn zero_length_rejected() {
        let lines = vec![line_string![(x: 2.0, y: 2.0), (x: 2.0, y: 2.0)]];
        assert_eq!(geometry_err(&lines), GeometryError::ZeroLength { line: 0 });
    }
}
