//! Error types for the autotuning engine.

use thiserror::Error;

/// Fatal errors: these terminate a sweep and propagate to the caller.
#[derive(Debug, Error)]
pub enum TuneError {
    /// Malformed interval text or an interval violating its declared policy.
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// A parameter name was registered twice in the same configuration space.
    #[error("duplicate tuning parameter: {0}")]
    DuplicateParameter(String),

    /// No code-generation template exists for the requested operation key.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Every candidate was either invalid or failed to execute.
    #[error("no viable profile in the search space")]
    NoViableProfile,

    /// The results file could not be written.
    #[error("results i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The target device could not be opened or queried.
    #[error("device error: {0}")]
    Device(#[from] BenchError),
}

/// Per-candidate benchmark failures. These are recovered locally by the
/// sweep loop: the candidate is logged and discarded, the sweep continues.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("kernel compilation failed: {0}")]
    Compile(String),

    #[error("kernel launch failed: {0}")]
    Launch(String),

    #[error("buffer transfer failed: {0}")]
    Transfer(String),
}
