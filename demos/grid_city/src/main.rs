//! grid_city — end-to-end accessibility run on a synthetic street grid.
//!
//! ```text
//! cargo run -p grid_city --release [-- path/to/config.json]
//! ```
//!
//! Without a config file the built-in analysis is used: a decay index and
//! a closest-service index for daily needs and for education, both
//! rescaled and combined into a weighted total.  Results land in
//! `output/grid_city/`.  Set `RUST_LOG=debug` for per-stage detail.

mod city;


use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use acc_core::{AnalysisConfig, Categories, IndexSpec, OriginId, RescaleMethod, TotalSpec};
use acc_index::Origin;
use acc_output::{CsvWriter, OutputWriter};
use acc_run::AnalysisBuilder;

const OUTPUT_DIR: &str = "output/grid_city";

fn default_config() -> Result<AnalysisConfig> {
    let daily = Categories::from_list(["groceries", "restaurant", "leisure"])?;
    let education = Categories::from_list(["kindergarten", "school"])?;

    Ok(AnalysisConfig {
        // Block centres sit ~106 m from the nearest corner.
        search_radius: 120.0,
        max_radius:    2_000.0,
        indices: vec![
            IndexSpec::decay("a1_daily", daily.clone()).with_rescale(RescaleMethod::MinMax),
            IndexSpec::decay("a1_education", education.clone())
                .with_rescale(RescaleMethod::MinMax),
            IndexSpec::closest("a2_daily", daily, 3).with_rescale(RescaleMethod::InverseMinMax),
            IndexSpec::closest("a2_education", education, 1)
                .with_rescale(RescaleMethod::InverseMinMax),
        ],
        total: Some(TotalSpec {
            name:    "total".into(),
            sources: vec!["a1_daily".into(), "a1_education".into()],
        }),
        ..AnalysisConfig::default()
    })
}

fn load_config(path: &str) -> Result<AnalysisConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => default_config()?,
    };

    let streets = city::streets();
    let blocks = city::blocks();
    let services = city::services(&config.categories)?;
    info!(
        streets = streets.len(),
        blocks = blocks.len(),
        services = services.len(),
        "generated grid city"
    );

    let origins = blocks.iter().enumerate().map(|(i, &(centroid, district))| {
        Origin::new(OriginId(i as u32), centroid).with_region(district)
    });

    let mut analysis = AnalysisBuilder::new(config)
        .lines(streets)
        .origins(origins)
        .destinations(services)
        .build()?;

    let t0 = Instant::now();
    let table = analysis.run()?;
    let elapsed = t0.elapsed();

    std::fs::create_dir_all(OUTPUT_DIR)?;
    let mut writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    writer.write_origins(&table)?;
    writer.write_destinations(&analysis.destinations)?;
    writer.finish()?;

    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "Network: {} nodes, {} edges",
        analysis.network.node_count(),
        analysis.network.edge_count()
    );
    println!();

    // Best and worst blocks by the combined score.
    if let Some(col) = table.column_index("total") {
        let mut ranked: Vec<_> = table.rows.iter().collect();
        ranked.sort_by(|a, b| b.values[col].total_cmp(&a.values[col]));
        println!("{:<8} {:<6} {:>10} {:>10}", "Origin", "Zone", "x", "total");
        println!("{}", "-".repeat(37));
        for row in ranked.iter().take(5).chain(ranked.iter().rev().take(5).rev()) {
            println!(
                "{:<8} {:<6} {:>10.1} {:>10.2}",
                row.id.0,
                row.region.as_deref().unwrap_or("-"),
                row.centroid.x,
                row.values[col],
            );
        }
    }

    Ok(())
}
