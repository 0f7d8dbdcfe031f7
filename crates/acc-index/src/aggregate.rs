//! Accessibility indices over a prepared origin.
//!
//! # Decay index
//!
//! ```text
//! A = Σ usage(d) · decay(distance(d))     over reachable d with category ∈ C
//! ```
//!
//! # Closest-service index
//!
//! For each category in `C`, the mean distance to the `n` nearest reachable
//! destinations, with missing slots filled by `max_radius`, converted to
//! minutes at `speed_kmh`.  The index is the mean over categories.  An origin
//! that reaches nothing of a category scores exactly the fallback time.
//!
//! Both indices take the categories argument as a [`CategoryArg`] and reject
//! a bare single name before touching any distance.

use acc_core::{AnalysisConfig, Categories, CategoryArg, CoreError, DecayPolicy, IndexKind, IndexSpec};

use crate::destination::DestinationSet;
use crate::origin::Origin;
use crate::{AccessError, AccessResult};

/// Computes index values from prepared origins.
///
/// Holds only shared references, so one aggregator serves every worker.
#[derive(Clone, Copy)]
pub struct Aggregator<'a> {
    config:       &'a AnalysisConfig,
    destinations: &'a DestinationSet,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a AnalysisConfig, destinations: &'a DestinationSet) -> Self {
        Self { config, destinations }
    }

    /// Usage-weighted decay sum with the configured default decay policy.
    pub fn decay_index(&self, origin: &Origin, categories: impl Into<CategoryArg>) -> AccessResult<f64> {
        self.decay_index_with(origin, categories, &self.config.decay)
    }

    /// Usage-weighted decay sum with an explicit decay policy.
    pub fn decay_index_with(
        &self,
        origin: &Origin,
        categories: impl Into<CategoryArg>,
        policy: &DecayPolicy,
    ) -> AccessResult<f64> {
        let categories = self.categories(categories)?;
        let reach = origin.try_reachable()?;

        let mut sum = 0.0;
        for r in reach {
            let Some(d) = self.destinations.get(r.destination) else { continue };
            if categories.contains(d.category()) {
                sum += d.usage() * policy.factor(r.distance);
            }
        }
        Ok(sum)
    }

    /// Mean travel time in minutes to the `n` closest destinations of each
    /// category, averaged over categories.
    pub fn closest_index(
        &self,
        origin: &Origin,
        categories: impl Into<CategoryArg>,
        n: usize,
    ) -> AccessResult<f64> {
        let categories = self.categories(categories)?;
        if n == 0 {
            return Err(CoreError::Config("closest n must be at least 1".into()).into());
        }
        let reach = origin.try_reachable()?;

        let fallback = self.config.max_radius;
        let mut total = 0.0;
        for category in categories.iter() {
            // `reach` is sorted nearest first; missing slots count as the fallback.
            let (taken, sum) = reach
                .iter()
                .filter(|r| {
                    self.destinations
                        .get(r.destination)
                        .is_some_and(|d| d.category() == category)
                })
                .take(n)
                .fold((0usize, 0.0), |(k, s), r| (k + 1, s + r.distance));
            let mean = (sum + (n - taken) as f64 * fallback) / n as f64;
            total += self.config.minutes_for(mean);
        }
        Ok(total / categories.len() as f64)
    }

    /// Evaluate one configured index.
    pub fn evaluate(&self, origin: &Origin, spec: &IndexSpec) -> AccessResult<f64> {
        match spec.kind {
            IndexKind::Decay => {
                self.decay_index_with(origin, &spec.categories, self.config.decay_for(spec))
            }
            IndexKind::Closest { n } => self.closest_index(origin, &spec.categories, n),
        }
    }

    /// Evaluate a configured index by name.
    pub fn evaluate_named(&self, origin: &Origin, name: &str) -> AccessResult<f64> {
        let spec = self
            .config
            .index(name)
            .ok_or_else(|| AccessError::UnknownIndex(name.to_owned()))?;
        self.evaluate(origin, spec)
    }

    /// Validate the categories argument and check every name against the
    /// usage table.
    fn categories(&self, arg: impl Into<CategoryArg>) -> AccessResult<Categories> {
        let categories = Categories::try_from(arg.into())?;
        for c in categories.iter() {
            self.config.categories.rule(c)?;
        }
        Ok(categories)
    }
}
