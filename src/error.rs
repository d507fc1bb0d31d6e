use thiserror::Error;

/// Errors surfaced by the simulation and valuation engine.
///
/// Configuration errors are always reported to the caller; data
/// inconsistencies (a matchup referencing an unknown team) degrade to a
/// zero contribution instead and never appear here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("simulation count must be positive, got {0}")]
    InvalidSimulationCount(usize),

    #[error("unsupported win probability model kind {0:?}")]
    UnsupportedModelKind(String),

    #[error("model sigma must be positive and finite, got {0}")]
    InvalidSigma(f64),

    #[error("bracket topology contains no games")]
    EmptyTopology,

    #[error("malformed bracket topology: {0}")]
    MalformedTopology(String),

    #[error("full-field prediction requires exactly {expected} teams, got {actual}")]
    WrongFieldSize { expected: usize, actual: usize },

    #[error("malformed field: {0}")]
    InvalidField(String),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}
