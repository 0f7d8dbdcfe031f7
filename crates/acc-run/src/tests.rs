//! Unit tests for acc-run.

#[cfg(test)]
mod fixtures {
    use acc_core::{AnalysisConfig, Categories, IndexSpec, Point, RescaleMethod, TotalSpec};
    use acc_index::{DestinationSet, DestinationSetBuilder};
    use geo::{line_string, LineString};

    /// Four 100 m streets forming a closed square with corners at
    /// (0,0), (100,0), (100,100), (0,100).
    pub fn square_lines() -> Vec<LineString<f64>> {
        vec![
            line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)],
            line_string![(x: 100.0, y: 0.0), (x: 100.0, y: 100.0)],
            line_string![(x: 100.0, y: 100.0), (x: 0.0, y: 100.0)],
            line_string![(x: 0.0, y: 100.0), (x: 0.0, y: 0.0)],
        ]
    }

    /// "shop" (usage 0.5), a rescaled decay and closest index on it, and a
    /// total over both.
    pub fn config() -> AnalysisConfig {
        let mut cfg = AnalysisConfig { search_radius: 50.0, ..Default::default() };
        cfg.categories.insert("shop", 0.5, false);
        let shop = Categories::from_list(["shop"]).unwrap();
        cfg.indices.push(IndexSpec::decay("a1_shop", shop.clone()).with_rescale(RescaleMethod::MinMax));
        cfg.indices.push(
            IndexSpec::closest("a2_shop", shop, 1).with_rescale(RescaleMethod::InverseMinMax),
        );
        cfg.total = Some(TotalSpec {
            name:    "total".into(),
            sources: vec!["a1_shop".into(), "a2_shop".into()],
        });
        cfg
    }

    pub fn shop_at_far_corner(cfg: &AnalysisConfig) -> DestinationSet {
        let mut b = DestinationSetBuilder::new(&cfg.categories);
        b.add("shop", Point::new(99.0, 99.0), None).unwrap();
        b.build()
    }
}

// ── AnalysisBuilder validation ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use acc_core::{AnalysisConfig, CoordSystem, OriginId, Point};
    use acc_index::Origin;
    use acc_network::{GeometryError, Network, NetworkError};
    use geo::line_string;

    use super::fixtures::{config, square_lines};
    use crate::{AnalysisBuilder, RunError};

    #[test]
    fn builds_from_lines() {
        let analysis = AnalysisBuilder::new(config())
            .lines(square_lines())
            .origin_points([Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
            .build()
            .unwrap();
        assert_eq!(analysis.network.node_count(), 4);
        assert_eq!(analysis.network.edge_count(), 4);
        assert_eq!(analysis.origins.len(), 2);
        assert!(analysis.origin(OriginId(1)).is_some());
    }

    #[test]
    fn accepts_prebuilt_network() {
        let analysis = AnalysisBuilder::new(config())
            .network(Network::empty(CoordSystem::Planar))
            .build()
            .unwrap();
        assert!(analysis.network.is_empty());
    }

    #[test]
    fn missing_network_errors() {
        let result = AnalysisBuilder::new(config()).build();
        assert!(matches!(result, Err(RunError::MissingNetwork)));
    }

    #[test]
    fn invalid_config_errors() {
        let cfg = AnalysisConfig { max_radius: -1.0, ..config() };
        let result = AnalysisBuilder::new(cfg).lines(square_lines()).build();
        assert!(matches!(result, Err(RunError::Config(_))));
    }

    #[test]
    fn duplicate_origin_ids_error() {
        let result = AnalysisBuilder::new(config())
            .lines(square_lines())
            .origin_points([Point::new(0.0, 0.0)])
            .origins([Origin::new(OriginId(0), Point::new(5.0, 5.0))])
            .build();
        assert!(matches!(result, Err(RunError::DuplicateOrigin(OriginId(0)))));
    }

    #[test]
    fn generated_ids_skip_explicit_origins() {
        let analysis = AnalysisBuilder::new(config())
            .lines(square_lines())
            .origins([
                Origin::new(OriginId(0), Point::new(5.0, 5.0)),
                Origin::new(OriginId(2), Point::new(6.0, 6.0)),
            ])
            .origin_points([Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
            .build()
            .unwrap();
        let mut ids: Vec<OriginId> = analysis.origins.iter().map(|o| o.id).collect();
        ids.sort();
        assert_eq!(ids, [OriginId(0), OriginId(1), OriginId(2), OriginId(3)]);
        assert_eq!(analysis.origin(OriginId(1)).map(|o| o.centroid), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn bad_geometry_aborts_before_processing() {
        let mut lines = square_lines();
        lines.push(line_string![(x: 0.0, y: 0.0), (x: f64::NAN, y: 3.0)]);
        let result = AnalysisBuilder::new(config())
            .lines(lines)
            .origin_points([Point::new(0.0, 0.0)])
            .build();
        assert!(matches!(
            result,
            Err(RunError::Network(NetworkError::Geometry(GeometryError::NonFinite { line: 4, vertex: 1 })))
        ));
    }
}

// ── Analysis::run ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use acc_core::{AnalysisConfig, OriginId, Point};
    use acc_index::{AccessError, Origin};

    use super::fixtures::{config, shop_at_far_corner, square_lines};
    use crate::{AnalysisBuilder, ResultTable, RunError};

    fn run_with(cfg: AnalysisConfig, origins: Vec<Origin>) -> ResultTable {
        let destinations = shop_at_far_corner(&cfg);
        let mut analysis = AnalysisBuilder::new(cfg)
            .lines(square_lines())
            .origins(origins)
            .destinations(destinations)
            .build()
            .unwrap();
        analysis.run().unwrap()
    }

    /// Origins deliberately out of id order.
    fn three_origins() -> Vec<Origin> {
        vec![
            Origin::new(OriginId(2), Point::new(99.0, 1.0)),
            Origin::new(OriginId(0), Point::new(1.0, 1.0)),
            Origin::new(OriginId(1), Point::new(5_000.0, 5_000.0)).with_region("outskirts"),
        ]
    }

    #[test]
    fn columns_in_order() {
        let table = run_with(config(), three_origins());
        assert_eq!(
            table.columns,
            vec!["a1_shop", "a2_shop", "a1_shop_scaled", "a2_shop_scaled", "total"]
        );
        for row in &table.rows {
            assert_eq!(row.values.len(), table.columns.len());
        }
    }

    #[test]
    fn rows_sorted_by_origin_id() {
        let table = run_with(config(), three_origins());
        let ids: Vec<OriginId> = table.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![OriginId(0), OriginId(1), OriginId(2)]);
    }

    #[test]
    fn square_scenario_values() {
        let cfg = config();
        let table = run_with(cfg.clone(), three_origins());

        let a1 = table.value(OriginId(0), "a1_shop").unwrap();
        assert!((a1 - 0.5 * (-0.2f64).exp()).abs() < 1e-12);
        let a2 = table.value(OriginId(0), "a2_shop").unwrap();
        assert!((a2 - 2.4).abs() < 1e-9);

        let near = table.value(OriginId(2), "a2_shop").unwrap();
        assert!((near - 1.2).abs() < 1e-9);
        assert_eq!(table.row(OriginId(2)).unwrap().reachable, 1);
    }

    #[test]
    fn off_network_origin_row() {
        let cfg = config();
        let table = run_with(cfg.clone(), three_origins());
        let row = table.row(OriginId(1)).unwrap();
        assert_eq!(row.access_node, None);
        assert_eq!(row.reachable, 0);
        assert_eq!(row.region.as_deref(), Some("outskirts"));
        assert_eq!(table.value(OriginId(1), "a1_shop"), Some(0.0));
        assert_eq!(table.value(OriginId(1), "a2_shop"), Some(cfg.fallback_minutes()));
    }

    #[test]
    fn rescaled_and_total_columns() {
        let table = run_with(config(), three_origins());
        // Origin 2 is best on both indices, origin 1 is worst.
        for col in ["a1_shop_scaled", "a2_shop_scaled", "total"] {
            let best = table.value(OriginId(2), col).unwrap();
            let worst = table.value(OriginId(1), col).unwrap();
            assert!((best - 100.0).abs() < 1e-9, "{col}: {best}");
            assert!(worst.abs() < 1e-9, "{col}: {worst}");
            let mid = table.value(OriginId(0), col).unwrap();
            assert!(mid > 0.0 && mid < 100.0, "{col}: {mid}");
        }
    }

    #[test]
    fn thread_count_does_not_change_results() {
        let one = run_with(AnalysisConfig { num_threads: Some(1), ..config() }, three_origins());
        let four = run_with(AnalysisConfig { num_threads: Some(4), ..config() }, three_origins());
        assert_eq!(one.rows, four.rows);
    }

    #[test]
    fn no_origins_gives_empty_table() {
        let table = run_with(config(), Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 5);
    }

    #[test]
    fn second_run_is_rejected() {
        let cfg = config();
        let destinations = shop_at_far_corner(&cfg);
        let mut analysis = AnalysisBuilder::new(cfg)
            .lines(square_lines())
            .origins(three_origins())
            .destinations(destinations)
            .build()
            .unwrap();
        analysis.run().unwrap();
        assert!(matches!(
            analysis.run(),
            Err(RunError::Access(AccessError::AlreadyDone { .. }))
        ));
    }

    #[test]
    fn many_origins_on_a_grid() {
        let origins: Vec<Origin> = (0..121)
            .map(|i| {
                let (x, y) = ((i % 11) as f64 * 10.0, (i / 11) as f64 * 10.0);
                Origin::new(OriginId(i), Point::new(x, y))
            })
            .collect();
        let table = run_with(config(), origins);
        assert_eq!(table.len(), 121);
        // Cells near a corner snap to it; central cells are too far from any node.
        let corners = table.rows.iter().filter(|r| r.access_node.is_some()).count();
        assert!(corners > 0 && corners < 121);
        for r in &table.rows {
            let a2 = r.values[1];
            assert!(a2 >= 0.0 && a2 <= 60.0);
        }
    }
}
