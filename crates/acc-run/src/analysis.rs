//! The `Analysis` struct and its per-origin worker pool.

use std::time::Instant;

use tracing::{info, warn};

use acc_core::{AnalysisConfig, OriginId};
use acc_index::{AccessResult, Aggregator, DestinationSet, Origin};
use acc_network::{Network, ShortestPaths};

use crate::table::{OriginRow, ResultTable};
use crate::RunResult;

/// A fully prepared analysis: validated config, immutable network, snapped
/// destinations, and origins waiting to be processed.
///
/// Create via [`AnalysisBuilder`](crate::AnalysisBuilder).
pub struct Analysis<R: ShortestPaths> {
    pub config: AnalysisConfig,

    /// Built once, never mutated; shared by every worker.
    pub network: Network,

    /// Origins in input order.  Each one's lifecycle state is filled in by
    /// [`run`](Self::run).
    pub origins: Vec<Origin>,

    /// Destinations with their access nodes already resolved.
    pub destinations: DestinationSet,

    pub(crate) router: R,
}

impl<R: ShortestPaths> Analysis<R> {
    /// Process every origin and assemble the result table.
    ///
    /// Each origin is resolved, searched, filtered, and aggregated
    /// independently (on Rayon's pool with the `parallel` feature).  The
    /// table is assembled only after every worker has finished.  A run can
    /// happen once: origins refuse to repeat lifecycle steps.
    pub fn run(&mut self) -> RunResult<ResultTable> {
        let started = Instant::now();
        info!(
            origins = self.origins.len(),
            destinations = self.destinations.len(),
            indices = self.config.indices.len(),
            "starting accessibility run"
        );

        let Self { config, network, origins, destinations, router } = self;
        let ctx = Context {
            config,
            network,
            destinations,
            router,
            aggregator: Aggregator::new(config, destinations),
        };
        let rows = install(config.num_threads, || process_all(&ctx, origins))??;

        let off_network = rows.iter().filter(|r| r.access_node.is_none()).count();
        if off_network > 0 {
            warn!(off_network, total = rows.len(), "origins without an access node");
        }

        let table = ResultTable::assemble(config, rows);
        info!(
            rows = table.len(),
            columns = table.columns.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "accessibility run finished"
        );
        Ok(table)
    }

    pub fn origin(&self, id: OriginId) -> Option<&Origin> {
        self.origins.iter().find(|o| o.id == id)
    }

    pub fn router(&self) -> &R {
        &self.router
    }
}

// ── Worker internals ──────────────────────────────────────────────────────────

/// Shared, read-only inputs every worker sees.
struct Context<'a, R: ShortestPaths> {
    config:       &'a AnalysisConfig,
    network:      &'a Network,
    destinations: &'a DestinationSet,
    router:       &'a R,
    aggregator:   Aggregator<'a>,
}

impl<R: ShortestPaths> Context<'_, R> {
    /// Full lifecycle plus every configured index for one origin.  Writes
    /// only to `origin`.
    fn process(&self, origin: &mut Origin) -> RunResult<OriginRow> {
        origin.prepare(self.network, self.router, self.destinations, self.config)?;
        let values = self
            .config
            .indices
            .iter()
            .map(|spec| self.aggregator.evaluate(origin, spec))
            .collect::<AccessResult<Vec<f64>>>()?;
        Ok(OriginRow::new(origin, values))
    }
}

#[cfg(not(feature = "parallel"))]
fn process_all<R: ShortestPaths>(ctx: &Context<'_, R>, origins: &mut [Origin]) -> RunResult<Vec<OriginRow>> {
    origins.iter_mut().map(|o| ctx.process(o)).collect()
}

#[cfg(feature = "parallel")]
fn process_all<R: ShortestPaths>(ctx: &Context<'_, R>, origins: &mut [Origin]) -> RunResult<Vec<OriginRow>> {
    use rayon::prelude::*;

    // `collect` returns only once every worker is done.
    origins.par_iter_mut().map(|o| ctx.process(o)).collect()
}

/// Run `op` on a dedicated pool of `threads` workers, or on the global pool
/// when `threads` is `None`.
#[cfg(feature = "parallel")]
fn install<T: Send>(threads: Option<usize>, op: impl FnOnce() -> T + Send) -> RunResult<T> {
    match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok(pool.install(op))
        }
        None => Ok(op()),
    }
}

#[cfg(not(feature = "parallel"))]
fn install<T>(_threads: Option<usize>, op: impl FnOnce() -> T) -> RunResult<T> {
    Ok(op())
}
