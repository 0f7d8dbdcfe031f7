//! Index-subsystem error types.
//!
//! A point that cannot be snapped to the network is **not** an error; see
//! [`AccessNode::OffNetwork`](crate::AccessNode::OffNetwork).

use thiserror::Error;

use acc_core::{CoreError, DestinationId, OriginId};
use acc_network::NetworkError;

#[derive(Debug, Error)]
pub enum AccessError {
    /// Invalid categories argument, unknown category, or bad config value.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    /// An origin step was attempted before the step it depends on.
    #[error("origin {origin}: cannot {step} before {requires}")]
    Lifecycle {
        origin:   OriginId,
        step:     &'static str,
        requires: &'static str,
    },

    /// An origin step that runs exactly once was attempted a second time.
    #[error("origin {origin}: {step} has already run")]
    AlreadyDone { origin: OriginId, step: &'static str },

    #[error("destination {0} already has an access node")]
    AccessNodeAlreadySet(DestinationId),

    #[error("duplicate destination id {0}")]
    DuplicateDestination(DestinationId),

    #[error("destination {destination} has invalid usage weight {usage}; must be in [0, 1]")]
    InvalidUsage { destination: DestinationId, usage: f64 },

    #[error("no index named {0:?} in the configuration")]
    UnknownIndex(String),
}

pub type AccessResult<T> = Result<T, AccessError>;
