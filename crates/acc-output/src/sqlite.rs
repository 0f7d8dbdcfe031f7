//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `origins` (one REAL column per index column) and
//! `destinations`.  Unreachable access nodes are stored as NULL.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::info;

use acc_index::DestinationSet;
use acc_run::ResultTable;

use crate::writer::{check_columns, OutputWriter};
use crate::OutputResult;

/// Writes accessibility results to an SQLite database.
pub struct SqliteWriter {
    conn:          Connection,
    index_columns: Option<Vec<String>>,
    origin_rows:   usize,
    finished:      bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the fixed schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS destinations (
                 destination_id    INTEGER PRIMARY KEY,
                 category          TEXT    NOT NULL,
                 usage             REAL    NOT NULL,
                 admin_constrained INTEGER NOT NULL,
                 region            TEXT,
                 x                 REAL    NOT NULL,
                 y                 REAL    NOT NULL,
                 access_node       INTEGER
             );",
        )?;

        Ok(Self { conn, index_columns: None, origin_rows: 0, finished: false })
    }

    fn create_origins_table(&self, columns: &[String]) -> OutputResult<()> {
        let mut ddl = String::from(
            "CREATE TABLE IF NOT EXISTS origins (
                 origin_id   INTEGER PRIMARY KEY,
                 region      TEXT,
                 x           REAL    NOT NULL,
                 y           REAL    NOT NULL,
                 access_node INTEGER,
                 reachable   INTEGER NOT NULL",
        );
        for c in columns {
            ddl.push_str(&format!(",\n                 {} REAL NOT NULL", quote_ident(c)));
        }
        ddl.push_str("\n             );");
        self.conn.execute_batch(&ddl)?;
        Ok(())
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl OutputWriter for SqliteWriter {
    fn write_origins(&mut self, table: &ResultTable) -> OutputResult<()> {
        if check_columns(&mut self.index_columns, &table.columns)? {
            self.create_origins_table(&table.columns)?;
        }
        if table.rows.is_empty() {
            return Ok(());
        }

        let placeholders: Vec<String> = (1..=6 + table.columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!("INSERT INTO origins VALUES ({})", placeholders.join(", "));

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for row in &table.rows {
                let fixed = [
                    Value::Integer(i64::from(row.id.0)),
                    row.region.clone().map_or(Value::Null, Value::Text),
                    Value::Real(row.centroid.x),
                    Value::Real(row.centroid.y),
                    row.access_node.map_or(Value::Null, |n| Value::Integer(i64::from(n.0))),
                    Value::Integer(row.reachable as i64),
                ];
                let values = row.values.iter().map(|&v| Value::Real(v));
                stmt.execute(params_from_iter(fixed.into_iter().chain(values)))?;
            }
        }
        tx.commit()?;
        self.origin_rows += table.rows.len();
        Ok(())
    }

    fn write_destinations(&mut self, destinations: &DestinationSet) -> OutputResult<()> {
        if destinations.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO destinations \
                 (destination_id, category, usage, admin_constrained, region, x, y, access_node) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for d in destinations.iter() {
                stmt.execute(rusqlite::params![
                    d.id().0,
                    d.category(),
                    d.usage(),
                    d.admin_constrained() as i64,
                    d.region(),
                    d.centroid().x,
                    d.centroid().y,
                    d.access_node().map(|n| n.0),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        info!(origin_rows = self.origin_rows, "SQLite output written");
        Ok(())
    }
}
