use thiserror::Error;

use acc_core::{CoreError, OriginId};
use acc_index::AccessError;
use acc_network::NetworkError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    /// Bad geometry or graph; the run cannot start.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("accessibility error: {0}")]
    Access(#[from] AccessError),

    #[error("no network supplied; call `lines` or `network` on the builder")]
    MissingNetwork,

    #[error("duplicate origin id {0}")]
    DuplicateOrigin(OriginId),

    #[cfg(feature = "parallel")]
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type RunResult<T> = Result<T, RunError>;
