//! `acc-index` — origins, destinations, distance caches, and accessibility
//! indices.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`access`]      | `AccessNode` (snapped node or off-network)               |
//! | [`destination`] | `Destination`, `DestinationSet`, `DestinationSetBuilder` |
//! | [`origin`]      | `Origin` lifecycle, `Reach`, `region_allows`             |
//! | [`cache`]       | `DistanceCache`                                          |
//! | [`aggregate`]   | `Aggregator` (decay and closest-service indices)         |
//! | [`rescale`]     | `rescale`, `weighted_total`                              |
//! | [`error`]       | `AccessError`, `AccessResult`                            |
//!
//! # Per-origin flow
//!
//! ```text
//! Origin ──resolve_access──▶ AccessNode
//!        ──compute_distances──▶ DistanceCache   (one bounded Dijkstra)
//!        ──select_destinations──▶ [Reach]       (cache keys ∩ region rule)
//!        ──Aggregator::evaluate──▶ f64 per index
//! ```

pub mod access;
pub mod aggregate;
pub mod cache;
pub mod destination;
pub mod error;
pub mod origin;
pub mod rescale;


pub use access::AccessNode;
pub use aggregate::Aggregator;
pub use cache::DistanceCache;
pub use destination::{Destination, DestinationSet, DestinationSetBuilder};
pub use error::{AccessError, AccessResult};
pub use origin::{region_allows, Origin, Reach};
pub use rescale::{rescale, weighted_total};
