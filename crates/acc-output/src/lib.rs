//! `acc-output` — export writers for accessibility results.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                               |
//! |-----------|---------|---------------------------------------------|
//! | *(none)*  | CSV     | `access_indices.csv`, `destinations.csv`    |
//! | `sqlite`  | SQLite  | `output.db` (`origins`, `destinations`)     |
//!
//! Both implement [`OutputWriter`].  "No access node" is an empty CSV cell
//! or SQL NULL, never a number, so it cannot be mistaken for node 0 or a
//! zero distance.
//!
//! # Usage
//!
//! ```rust,ignore
//! use acc_output::{CsvWriter, OutputWriter};
//!
//! let table = analysis.run()?;
//! let mut w = CsvWriter::new(Path::new("./output"))?;
//! w.write_origins(&table)?;
//! w.write_destinations(&analysis.destinations)?;
//! w.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use writer::{OutputWriter, DESTINATION_COLUMNS, ORIGIN_COLUMNS};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
