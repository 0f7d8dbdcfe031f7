//! The per-origin result table.
//!
//! One row per origin, in ascending origin id order, with one value per
//! column.  Column order: every configured index, then a `<name>_scaled`
//! column for each index with a rescale method, then the optional total.

use acc_core::{AnalysisConfig, NodeId, OriginId, Point};
use acc_index::{rescale, weighted_total, AccessNode, Origin};

/// One origin's results.
#[derive(Clone, Debug, PartialEq)]
pub struct OriginRow {
    pub id:          OriginId,
    pub region:      Option<String>,
    pub centroid:    Point,
    /// `None` when the origin is off the network.
    pub access_node: Option<NodeId>,
    /// Number of destinations reachable after region filtering.
    pub reachable:   usize,
    /// Aligned with [`ResultTable::columns`].
    pub values:      Vec<f64>,
}

impl OriginRow {
    pub(crate) fn new(origin: &Origin, values: Vec<f64>) -> Self {
        Self {
            id:          origin.id,
            region:      origin.region.clone(),
            centroid:    origin.centroid,
            access_node: origin.access().and_then(AccessNode::node),
            reachable:   origin.reachable().map_or(0, <[_]>::len),
            values,
        }
    }
}

/// Column names plus rows.
#[derive(Clone, Debug, Default)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows:    Vec<OriginRow>,
}

impl ResultTable {
    /// Sort rows and append rescaled and total columns.  `rows` carry one
    /// value per configured index.
    pub(crate) fn assemble(config: &AnalysisConfig, mut rows: Vec<OriginRow>) -> Self {
        rows.sort_by_key(|r| r.id);
        let mut table = Self {
            columns: config.indices.iter().map(|s| s.name.clone()).collect(),
            rows,
        };

        for (i, spec) in config.indices.iter().enumerate() {
            let (Some(method), Some(name)) = (spec.rescale, spec.scaled_name()) else {
                continue;
            };
            let raw: Vec<f64> = table.rows.iter().map(|r| r.values[i]).collect();
            table.push_column(name, rescale(&raw, method));
        }

        if let Some(total) = &config.total {
            let sources: Vec<(Vec<f64>, f64)> = total
                .sources
                .iter()
                .filter_map(|src| {
                    let spec = config.index(src)?;
                    let column = table.column(&spec.scaled_name()?)?;
                    Some((column, config.categories.usage_sum(&spec.categories)))
                })
                .collect();
            let weighted: Vec<(&[f64], f64)> =
                sources.iter().map(|(c, w)| (c.as_slice(), *w)).collect();
            let values = if weighted.is_empty() {
                vec![0.0; table.rows.len()]
            } else {
                weighted_total(&weighted)
            };
            table.push_column(total.name.clone(), values);
        }
        table
    }

    fn push_column(&mut self, name: String, values: Vec<f64>) {
        self.columns.push(name);
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.values.push(v);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// A whole column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let i = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[i]).collect())
    }

    pub fn row(&self, id: OriginId) -> Option<&OriginRow> {
        self.rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// One cell.
    pub fn value(&self, id: OriginId, column: &str) -> Option<f64> {
        let i = self.column_index(column)?;
        self.row(id).map(|r| r.values[i])
    }
}
