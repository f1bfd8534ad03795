//! Error types for the engine
//!
//! Evaluator failures are fatal to the search that hit them and are
//! propagated unchanged to the caller of `search`/`rank`.

/// Engine errors
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// No scoring model is loaded
    #[error("evaluator unavailable: no scoring model loaded")]
    EvaluatorUnavailable,

    /// The scoring model returned a batch of the wrong length
    #[error("evaluator returned {actual} scores for {expected} positions")]
    EvaluatorOutput { expected: usize, actual: usize },

    /// A move that is not legal in the position it was applied to
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// Weight dimension mismatch
    #[error("weight dimension mismatch in {layer}: expected {expected}, got {actual}")]
    DimensionMismatch {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// File I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed weights file
    #[error("invalid weights file: {0}")]
    Weights(#[from] serde_json::Error),

    /// Malformed configuration file
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
