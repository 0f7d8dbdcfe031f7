//! Fluent builder for constructing an [`Analysis`].

use geo::LineString;
use rustc_hash::FxHashSet;
use tracing::{info, warn};

use acc_core::{AnalysisConfig, IdSequence, OriginId, Point};
use acc_index::{DestinationSet, Origin};
use acc_network::{Dijkstra, Network, NormalizeOptions, ShortestPaths};

use crate::{Analysis, RunError, RunResult};

enum NetworkSource {
    Lines(Vec<LineString<f64>>),
    Built(Network),
}

/// Fluent builder for [`Analysis<R>`].
///
/// # Required inputs
///
/// - [`AnalysisConfig`], validated in [`build`](Self::build)
/// - a network, either raw lines ([`lines`](Self::lines)) or a built
///   [`Network`] ([`network`](Self::network))
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default            |
/// |----------------------|--------------------|
/// | `.origins(v)`        | no origins         |
/// | `.destinations(s)`   | empty set          |
/// | `.router(r)`         | [`Dijkstra`]       |
///
/// # Example
///
/// ```rust,ignore
/// let mut db = DestinationSetBuilder::new(&config.categories);
/// db.add("school", Point::new(120.0, 80.0), Some("north"))?;
/// let destinations = db.build();
///
/// let mut analysis = AnalysisBuilder::new(config)
///     .lines(streets)
///     .origin_points(cell_centres)
///     .destinations(destinations)
///     .build()?;
/// let table = analysis.run()?;
/// ```
pub struct AnalysisBuilder<R: ShortestPaths = Dijkstra> {
    config:       AnalysisConfig,
    network:      Option<NetworkSource>,
    origins:      Vec<Origin>,
    origin_ids:   IdSequence<OriginId>,
    destinations: DestinationSet,
    router:       R,
}

impl AnalysisBuilder<Dijkstra> {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            network:      None,
            origins:      Vec::new(),
            origin_ids:   IdSequence::new(),
            destinations: DestinationSet::default(),
            router:       Dijkstra,
        }
    }
}

impl<R: ShortestPaths> AnalysisBuilder<R> {
    /// Build the network from raw line geometries.
    pub fn lines(mut self, lines: Vec<LineString<f64>>) -> Self {
        self.network = Some(NetworkSource::Lines(lines));
        self
    }

    /// Use an already built network.
    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(NetworkSource::Built(network));
        self
    }

    pub fn origins(mut self, origins: impl IntoIterator<Item = Origin>) -> Self {
        self.origins.extend(origins);
        self
    }

    /// One origin per point, with ids from a run-scoped sequence.  Ids
    /// already taken by origins added so far are skipped.
    pub fn origin_points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        let taken: FxHashSet<OriginId> = self.origins.iter().map(|o| o.id).collect();
        for p in points {
            let mut id = self.origin_ids.next_id();
            while taken.contains(&id) {
                id = self.origin_ids.next_id();
            }
            self.origins.push(Origin::new(id, p));
        }
        self
    }

    pub fn destinations(mut self, destinations: DestinationSet) -> Self {
        self.destinations = destinations;
        self
    }

    /// Swap the shortest-path engine.
    pub fn router<R2: ShortestPaths>(self, router: R2) -> AnalysisBuilder<R2> {
        AnalysisBuilder {
            config:       self.config,
            network:      self.network,
            origins:      self.origins,
            origin_ids:   self.origin_ids,
            destinations: self.destinations,
            router,
        }
    }

    /// Validate inputs, build the network, snap destinations, and return a
    /// ready-to-run [`Analysis`].
    ///
    /// Any geometry or graph error aborts here, before a single origin is
    /// touched.
    pub fn build(mut self) -> RunResult<Analysis<R>> {
        self.config.validate()?;

        let mut seen = FxHashSet::default();
        for o in &self.origins {
            if !seen.insert(o.id) {
                return Err(RunError::DuplicateOrigin(o.id));
            }
        }

        let network = match self.network.take().ok_or(RunError::MissingNetwork)? {
            NetworkSource::Lines(lines) => {
                Network::from_lines(&lines, &NormalizeOptions::from_config(&self.config))?
            }
            NetworkSource::Built(n) => n,
        };
        if network.is_empty() {
            warn!("network has no nodes; every origin will be off the network");
        }
        info!(nodes = network.node_count(), edges = network.edge_count(), "network ready");

        self.destinations.resolve_access(&network, self.config.search_radius)?;

        Ok(Analysis {
            config:       self.config,
            network,
            origins:      self.origins,
            destinations: self.destinations,
            router:       self.router,
        })
    }
}
