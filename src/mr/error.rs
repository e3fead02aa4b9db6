use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// Failures of the engine's own synchronization primitives are not
/// represented here; those terminate the process (see [`crate::util::fatal`]).
#[derive(Debug, Error)]
pub enum Error {
    #[error("{role} thread count must be at least 1")]
    NoThreads { role: &'static str },

    #[error("chunk size must be at least 1")]
    ZeroChunkSize,

    #[error("failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}
