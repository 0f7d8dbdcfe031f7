//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `access_indices.csv`: one row per origin
//! - `destinations.csv`: one row per destination

use std::fs::File;
use std::path::Path;

use csv::Writer;
use tracing::info;

use acc_index::DestinationSet;
use acc_run::ResultTable;

use crate::writer::{check_columns, OutputWriter, DESTINATION_COLUMNS, ORIGIN_COLUMNS};
use crate::OutputResult;

/// Writes accessibility results to two CSV files.
pub struct CsvWriter {
    origins:       Writer<File>,
    destinations:  Writer<File>,
    index_columns: Option<Vec<String>>,
    origin_rows:   usize,
    finished:      bool,
}

impl CsvWriter {
    /// Create both files in `dir`.  The destination header is written now;
    /// the origin header waits for the first table.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let origins = Writer::from_path(dir.join("access_indices.csv"))?;

        let mut destinations = Writer::from_path(dir.join("destinations.csv"))?;
        destinations.write_record(DESTINATION_COLUMNS)?;

        Ok(Self {
            origins,
            destinations,
            index_columns: None,
            origin_rows: 0,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_origins(&mut self, table: &ResultTable) -> OutputResult<()> {
        if check_columns(&mut self.index_columns, &table.columns)? {
            let header = ORIGIN_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .chain(table.columns.iter().cloned());
            self.origins.write_record(header)?;
        }
        for row in &table.rows {
            let fixed = [
                row.id.0.to_string(),
                row.region.clone().unwrap_or_default(),
                row.centroid.x.to_string(),
                row.centroid.y.to_string(),
                row.access_node.map(|n| n.0.to_string()).unwrap_or_default(),
                row.reachable.to_string(),
            ];
            let values = row.values.iter().map(f64::to_string);
            self.origins.write_record(fixed.into_iter().chain(values))?;
        }
        self.origin_rows += table.rows.len();
        Ok(())
    }

    fn write_destinations(&mut self, destinations: &DestinationSet) -> OutputResult<()> {
        for d in destinations.iter() {
            self.destinations.write_record(&[
                d.id().0.to_string(),
                d.category().to_owned(),
                d.usage().to_string(),
                (d.admin_constrained() as u8).to_string(),
                d.region().unwrap_or_default().to_owned(),
                d.centroid().x.to_string(),
                d.centroid().y.to_string(),
                d.access_node().map(|n| n.0.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.origins.flush()?;
        self.destinations.flush()?;
        info!(origin_rows = self.origin_rows, "CSV output written");
        Ok(())
    }
}
