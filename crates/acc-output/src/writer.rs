//! The `OutputWriter` trait implemented by all backend writers.

use acc_index::DestinationSet;
use acc_run::ResultTable;

use crate::OutputResult;

/// Trait implemented by the CSV and SQLite writers.
///
/// The origin table's index columns are only known once the first table
/// arrives, so backends create that schema lazily.  Later tables must carry
/// the same columns.
pub trait OutputWriter {
    /// Write one row per origin.  An origin without an access node is written
    /// as an empty (CSV) or NULL (SQLite) `access_node`.
    fn write_origins(&mut self, table: &ResultTable) -> OutputResult<()>;

    /// Write one row per destination with its resolved access node.
    fn write_destinations(&mut self, destinations: &DestinationSet) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Fixed leading columns of the origin table, before the index columns.
pub const ORIGIN_COLUMNS: [&str; 6] = ["origin_id", "region", "x", "y", "access_node", "reachable"];

/// Columns of the destination table.
pub const DESTINATION_COLUMNS: [&str; 8] = [
    "destination_id",
    "category",
    "usage",
    "admin_constrained",
    "region",
    "x",
    "y",
    "access_node",
];

/// Check `got` against the columns fixed by the first table, or fix them.
pub(crate) fn check_columns(fixed: &mut Option<Vec<String>>, got: &[String]) -> OutputResult<bool> {
    match fixed {
        Some(expected) if expected.as_slice() == got => Ok(false),
        Some(expected) => Err(crate::OutputError::ColumnMismatch {
            expected: expected.clone(),
            got:      got.to_vec(),
        }),
        None => {
            *fixed = Some(got.to_vec());
            Ok(true)
        }
    }
}
