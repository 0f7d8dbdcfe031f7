//! `acc-core` — foundational types for the network accessibility engine.
//!
//! This crate is a dependency of every other `acc-*` crate.  It has no
//! `acc-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                         |
//! |------------|------------------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`, `OriginId`, `DestinationId`, `IdSequence`    |
//! | [`geo`]    | `Point`, `CoordSystem`, planar and haversine distance            |
//! | [`config`] | `AnalysisConfig`, `CategoryTable`, `DecayPolicy`, `IndexSpec`, … |
//! | [`error`]  | `CoreError`, `CoreResult`                                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    AnalysisConfig, Categories, CategoryArg, CategoryRule, CategoryTable, DecayBand, DecayPolicy,
    IndexKind, IndexSpec, RegionRule, RescaleMethod, TotalSpec,
};
pub use error::{CoreError, CoreResult};
pub use geo::{CoordSystem, Point};
pub use ids::{DestinationId, EdgeId, IdSequence, NodeId, OriginId};
