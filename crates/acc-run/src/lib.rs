//! `acc-run` — analysis orchestrator for the network accessibility engine.
//!
//! # Run phases
//!
//! ```text
//! AnalysisBuilder::build
//!   ① validate AnalysisConfig
//!   ② normalize lines → Network (or take a prebuilt one); any
//!      geometry/graph error aborts the run here
//!   ③ snap every destination to its access node
//!
//! Analysis::run
//!   ④ per origin (parallel with the `parallel` feature):
//!        resolve access node → distance cache → destination selection
//!        → one value per configured index
//!   ⑤ join: wait for every worker
//!   ⑥ sort rows by origin id, append rescaled columns and the total
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `parallel` | (default) Processes origins on Rayon's pool.      |

pub mod analysis;
pub mod builder;
pub mod error;
pub mod table;

#[cfg(test)]
mod tests;

pub use analysis::Analysis;
pub use builder::AnalysisBuilder;
pub use error::{RunError, RunResult};
pub use table::{OriginRow, ResultTable};
