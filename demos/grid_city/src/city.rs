//! Synthetic street grid with residential blocks and services.
//!
//! Streets run every `BLOCK_M` metres in both directions and are supplied
//! as full-length polylines, so the normalizer has to split them at every
//! crossing.  Each block centre is an origin; services are scattered on
//! fixed block corners so the run is reproducible.

use geo::{LineString, coord};

use acc_core::{CategoryTable, Point};
use acc_index::{AccessResult, DestinationSet, DestinationSetBuilder};

pub const BLOCKS:  usize = 20;
pub const BLOCK_M: f64   = 150.0;

/// One east-west and one north-south polyline per street.
pub fn streets() -> Vec<LineString<f64>> {
    let extent = BLOCKS as f64 * BLOCK_M;
    (0..=BLOCKS)
        .flat_map(|i| {
            let at = i as f64 * BLOCK_M;
            [
                LineString::new(vec![coord! { x: 0.0, y: at }, coord! { x: extent, y: at }]),
                LineString::new(vec![coord! { x: at, y: 0.0 }, coord! { x: at, y: extent }]),
            ]
        })
        .collect()
}

/// Block centres, tagged with the district (west/east half) they lie in.
pub fn blocks() -> Vec<(Point, &'static str)> {
    let half = BLOCKS / 2;
    (0..BLOCKS)
        .flat_map(|row| (0..BLOCKS).map(move |col| (row, col)))
        .map(|(row, col)| {
            let p = Point::new((col as f64 + 0.5) * BLOCK_M, (row as f64 + 0.5) * BLOCK_M);
            (p, district(col, half))
        })
        .collect()
}

fn district(col: usize, half: usize) -> &'static str {
    if col < half { "west" } else { "east" }
}

/// Services at block corners, every `stride` blocks per category.
pub fn services(table: &CategoryTable) -> AccessResult<DestinationSet> {
    // (category, stride in blocks, offset in blocks)
    const LAYOUT: [(&str, usize, usize); 6] = [
        ("groceries",    4, 2),
        ("school",       8, 3),
        ("kindergarten", 6, 1),
        ("healthcare",  10, 5),
        ("restaurant",   3, 0),
        ("leisure",      7, 4),
    ];

    let half = BLOCKS / 2;
    let mut b = DestinationSetBuilder::new(table);
    for (category, stride, offset) in LAYOUT {
        for row in (offset..=BLOCKS).step_by(stride) {
            for col in (offset..=BLOCKS).step_by(stride) {
                let p = Point::new(col as f64 * BLOCK_M, row as f64 * BLOCK_M);
                b.add(category, p, Some(district(col, half)))?;
            }
        }
    }
    Ok(b.build())
}
