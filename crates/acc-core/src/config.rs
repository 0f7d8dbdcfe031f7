//! Analysis configuration.
//!
//! # Design
//!
//! Everything that shapes one accessibility run lives in [`AnalysisConfig`]:
//! snapping and reachability radii, travel speed, decay policies, the
//! category usage table, and the list of index columns to compute.  It is
//! typically loaded from a JSON file by the application crate (enable the
//! `serde` feature) and must pass [`AnalysisConfig::validate`] before any
//! network is built.

use std::collections::{BTreeMap, BTreeSet};

use crate::geo::CoordSystem;
use crate::{CoreError, CoreResult};

// ── Category usage table ──────────────────────────────────────────────────────

/// Per-category settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryRule {
    /// Fraction of the population typically using this category, in `[0, 1]`.
    pub usage: f64,
    /// Destinations of this category are only available to origins in the
    /// same administrative region.
    #[cfg_attr(feature = "serde", serde(default))]
    pub admin_constrained: bool,
}

/// Mapping from category name to its [`CategoryRule`].
///
/// Every category referenced by a destination must have an entry.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CategoryTable(BTreeMap<String, CategoryRule>);

impl CategoryTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The service categories and usage rates of the reference study area.
    pub fn default_services() -> Self {
        let mut t = Self::new();
        t.insert("kindergarten", 0.06, true);
        t.insert("school", 0.16, true);
        t.insert("errands", 0.03, false);
        t.insert("healthcare", 0.06, false);
        t.insert("groceries", 0.48, false);
        t.insert("leisure", 0.03, false);
        t.insert("restaurant", 0.06, false);
        t.insert("sports_facility", 0.10, false);
        t
    }

    pub fn insert(&mut self, category: impl Into<String>, usage: f64, admin_constrained: bool) {
        self.0.insert(category.into(), CategoryRule { usage, admin_constrained });
    }

    pub fn get(&self, category: &str) -> Option<&CategoryRule> {
        self.0.get(category)
    }

    /// Look up a category, failing with [`CoreError::UnknownCategory`].
    pub fn rule(&self, category: &str) -> CoreResult<&CategoryRule> {
        self.0
            .get(category)
            .ok_or_else(|| CoreError::UnknownCategory(category.to_owned()))
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryRule)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of usage weights over `categories` (unknown names count as 0).
    pub fn usage_sum(&self, categories: &Categories) -> f64 {
        categories
            .iter()
            .filter_map(|c| self.0.get(c))
            .map(|r| r.usage)
            .sum()
    }

    fn validate(&self) -> CoreResult<()> {
        for (name, rule) in &self.0 {
            if !(0.0..=1.0).contains(&rule.usage) {
                return Err(CoreError::Config(format!(
                    "usage for category {name:?} must be in [0, 1], got {}",
                    rule.usage
                )));
            }
        }
        Ok(())
    }
}

// ── Category filters ──────────────────────────────────────────────────────────

/// Raw categories argument as it arrives from a config file or caller.
///
/// Only the `List` form is acceptable; `Single` exists so that a bare name
/// is caught and rejected instead of being treated as a sequence.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CategoryArg {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for CategoryArg {
    fn from(s: &str) -> Self {
        CategoryArg::Single(s.to_owned())
    }
}

impl From<String> for CategoryArg {
    fn from(s: String) -> Self {
        CategoryArg::Single(s)
    }
}

impl From<Vec<String>> for CategoryArg {
    fn from(v: Vec<String>) -> Self {
        CategoryArg::List(v)
    }
}

impl From<&[&str]> for CategoryArg {
    fn from(v: &[&str]) -> Self {
        CategoryArg::List(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CategoryArg {
    fn from(v: [&str; N]) -> Self {
        CategoryArg::List(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<Categories> for CategoryArg {
    fn from(c: Categories) -> Self {
        CategoryArg::List(c.0)
    }
}

impl From<&Categories> for CategoryArg {
    fn from(c: &Categories) -> Self {
        CategoryArg::List(c.0.clone())
    }
}

/// A validated, non-empty, duplicate-free list of category names.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "CategoryArg"))]
pub struct Categories(Vec<String>);

impl Categories {
    /// Build from any list of names.  Duplicates are dropped, first
    /// occurrence wins.
    pub fn from_list<I, S>(names: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let list: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|n| seen.insert(n.clone()))
            .collect();
        if list.is_empty() {
            return Err(CoreError::CategoryArgument("an empty list".to_owned()));
        }
        Ok(Self(list))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.iter().any(|c| c == category)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<CategoryArg> for Categories {
    type Error = CoreError;

    fn try_from(arg: CategoryArg) -> CoreResult<Self> {
        match arg {
            CategoryArg::Single(s) => Err(CoreError::CategoryArgument(format!("bare value {s:?}"))),
            CategoryArg::List(v) => Categories::from_list(v),
        }
    }
}

impl<const N: usize> TryFrom<[&str; N]> for Categories {
    type Error = CoreError;

    fn try_from(names: [&str; N]) -> CoreResult<Self> {
        Categories::from_list(names)
    }
}

// ── Decay ─────────────────────────────────────────────────────────────────────

/// One band of a bucketed decay table: distances up to and including
/// `upper_m` (and above the previous band) decay to `value`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecayBand {
    pub upper_m: f64,
    pub value:   f64,
}

/// Distance-decay function applied to network distances.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum DecayPolicy {
    /// `exp(-rate_per_km * distance_km + offset)`.
    Exponential {
        rate_per_km: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        offset: f64,
    },
    /// Constant value per distance band; beyond the last band the factor is 0.
    Bucketed { bands: Vec<DecayBand> },
}

impl Default for DecayPolicy {
    fn default() -> Self {
        DecayPolicy::Exponential { rate_per_km: 1.0, offset: 0.0 }
    }
}

impl DecayPolicy {
    /// Bands 0–100 m, 100 m–1 km, 1–2 km, 2–3 km, 3–5 km; nothing beyond 5 km.
    pub fn default_buckets() -> Self {
        let band = |upper_m, value| DecayBand { upper_m, value };
        DecayPolicy::Bucketed {
            bands: vec![
                band(100.0, 1.0),
                band(1_000.0, 0.8),
                band(2_000.0, 0.6),
                band(3_000.0, 0.4),
                band(5_000.0, 0.2),
            ],
        }
    }

    /// Decay factor for a network distance in metres.
    pub fn factor(&self, distance_m: f64) -> f64 {
        match self {
            DecayPolicy::Exponential { rate_per_km, offset } => {
                (-rate_per_km * distance_m / 1_000.0 + offset).exp()
            }
            DecayPolicy::Bucketed { bands } => bands
                .iter()
                .find(|b| distance_m <= b.upper_m)
                .map_or(0.0, |b| b.value),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        match self {
            DecayPolicy::Exponential { rate_per_km, offset } => {
                if !rate_per_km.is_finite() || *rate_per_km < 0.0 || !offset.is_finite() {
                    return Err(CoreError::Config(format!(
                        "exponential decay needs a finite rate >= 0 and finite offset, \
                         got rate {rate_per_km}, offset {offset}"
                    )));
                }
            }
            DecayPolicy::Bucketed { bands } => {
                if bands.is_empty() {
                    return Err(CoreError::Config("bucketed decay needs at least one band".into()));
                }
                for pair in bands.windows(2) {
                    if pair[1].upper_m <= pair[0].upper_m {
                        return Err(CoreError::Config(
                            "decay band upper bounds must be strictly ascending".into(),
                        ));
                    }
                    if pair[1].value > pair[0].value {
                        return Err(CoreError::Config(
                            "decay band values must not increase with distance".into(),
                        ));
                    }
                }
                if bands.iter().any(|b| !b.value.is_finite() || b.value < 0.0 || b.upper_m.is_nan()) {
                    return Err(CoreError::Config(
                        "decay band values must be finite and non-negative".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ── Index specifications ──────────────────────────────────────────────────────

/// Which aggregation an index column uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IndexKind {
    /// Usage-weighted sum of decay factors (choice index).
    Decay,
    /// Mean travel time in minutes to the `n` closest destinations per
    /// category, averaged across categories.
    Closest { n: usize },
}

/// Post-processing rescale of an index column to a 0–100 scale.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RescaleMethod {
    /// `100 * (x - min) / (max - min)`; higher is better.
    MinMax,
    /// `100 * (max - x) / (max - min)`; lower raw values score higher.
    InverseMinMax,
    /// `100 * x / max`.
    MaxRatio,
}

/// One requested index column.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexSpec {
    /// Output column name, e.g. `"a1_school"`.
    pub name:       String,
    pub kind:       IndexKind,
    pub categories: Categories,
    /// Overrides [`AnalysisConfig::decay`] for this column.
    #[cfg_attr(feature = "serde", serde(default))]
    pub decay:      Option<DecayPolicy>,
    /// Adds a `<name>_scaled` column rescaled with this method.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rescale:    Option<RescaleMethod>,
}

impl IndexSpec {
    pub fn decay(name: impl Into<String>, categories: Categories) -> Self {
        Self { name: name.into(), kind: IndexKind::Decay, categories, decay: None, rescale: None }
    }

    pub fn closest(name: impl Into<String>, categories: Categories, n: usize) -> Self {
        Self {
            name: name.into(),
            kind: IndexKind::Closest { n },
            categories,
            decay: None,
            rescale: None,
        }
    }

    pub fn with_decay(mut self, decay: DecayPolicy) -> Self {
        self.decay = Some(decay);
        self
    }

    pub fn with_rescale(mut self, method: RescaleMethod) -> Self {
        self.rescale = Some(method);
        self
    }

    /// Name of the rescaled column, if one is requested.
    pub fn scaled_name(&self) -> Option<String> {
        self.rescale.map(|_| format!("{}_scaled", self.name))
    }
}

/// Weighted linear combination of rescaled index columns.
///
/// Each source column is weighted by the summed usage of its categories.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TotalSpec {
    pub name:    String,
    /// Index names; each must carry a `rescale` method.
    pub sources: Vec<String>,
}

/// How the admin-constraint flag is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RegionRule {
    /// Same-region test only for destinations whose flag is set.
    #[default]
    FlaggedOnly,
    /// Every destination must share the origin's region.
    AlwaysSameRegion,
    /// Regions are never compared.
    Ignore,
}

// ── AnalysisConfig ────────────────────────────────────────────────────────────

/// Top-level accessibility analysis configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// Coordinate system of network, origins, and destinations.
    pub crs: CoordSystem,

    /// Endpoints closer than this collapse into one node: coordinate units
    /// when planar, metres when geographic.  Default: 0.1.
    pub snap_tolerance: f64,

    /// Drop edges that share no endpoint with any other edge.
    pub drop_isolated: bool,

    /// Maximum snapping distance (metres) from a point to its access node.
    pub search_radius: f64,

    /// Destinations further than this network distance (metres) are
    /// unreachable.
    pub max_radius: f64,

    /// Effective travel speed for closest-service times.  Default: 5 km/h.
    pub speed_kmh: f64,

    /// Decay policy for decay indices without their own override.
    pub decay: DecayPolicy,

    pub region_rule: RegionRule,

    pub categories: CategoryTable,

    pub indices: Vec<IndexSpec>,

    pub total: Option<TotalSpec>,

    /// Worker thread count.  `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            crs:            CoordSystem::Planar,
            snap_tolerance: 0.1,
            drop_isolated:  true,
            search_radius:  250.0,
            max_radius:     5_000.0,
            speed_kmh:      5.0,
            decay:          DecayPolicy::default(),
            region_rule:    RegionRule::FlaggedOnly,
            categories:     CategoryTable::default_services(),
            indices:        Vec::new(),
            total:          None,
            num_threads:    None,
        }
    }
}

impl AnalysisConfig {
    /// Travel time in minutes for a network distance in metres.
    #[inline]
    pub fn minutes_for(&self, distance_m: f64) -> f64 {
        distance_m / 1_000.0 / self.speed_kmh * 60.0
    }

    /// Closest-service value used when nothing of a category is reachable:
    /// the travel time to the edge of the search boundary.
    #[inline]
    pub fn fallback_minutes(&self) -> f64 {
        self.minutes_for(self.max_radius)
    }

    /// The decay policy that applies to `spec`.
    pub fn decay_for<'a>(&'a self, spec: &'a IndexSpec) -> &'a DecayPolicy {
        spec.decay.as_ref().unwrap_or(&self.decay)
    }

    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indices.iter().find(|s| s.name == name)
    }

    /// Check every invariant.  Called before any network work starts.
    pub fn validate(&self) -> CoreResult<()> {
        positive("search_radius", self.search_radius)?;
        positive("max_radius", self.max_radius)?;
        positive("speed_kmh", self.speed_kmh)?;
        if !self.snap_tolerance.is_finite() || self.snap_tolerance < 0.0 {
            return Err(CoreError::Config(format!(
                "snap_tolerance must be finite and >= 0, got {}",
                self.snap_tolerance
            )));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }

        self.categories.validate()?;
        self.decay.validate()?;

        // Every output column: index names plus their `_scaled` companions.
        let mut names = BTreeSet::new();
        for spec in &self.indices {
            for column in std::iter::once(spec.name.clone()).chain(spec.scaled_name()) {
                if !names.insert(column) {
                    return Err(CoreError::Config(format!(
                        "index {:?}: duplicate column name",
                        spec.name
                    )));
                }
            }
            if let IndexKind::Closest { n: 0 } = spec.kind {
                return Err(CoreError::Config(format!(
                    "index {:?}: closest n must be at least 1",
                    spec.name
                )));
            }
            if let Some(d) = &spec.decay {
                d.validate()?;
            }
            for c in spec.categories.iter() {
                self.categories.rule(c)?;
            }
        }

        if let Some(total) = &self.total {
            if names.contains(&total.name) {
                return Err(CoreError::Config(format!(
                    "total column {:?} clashes with an index column",
                    total.name
                )));
            }
            for source in &total.sources {
                match self.index(source) {
                    None => {
                        return Err(CoreError::Config(format!(
                            "total source {source:?} is not a configured index"
                        )));
                    }
                    Some(spec) if spec.rescale.is_none() => {
                        return Err(CoreError::Config(format!(
                            "total source {source:?} must declare a rescale method"
                        )));
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{field} must be finite and > 0, got {value}")))
    }
}
