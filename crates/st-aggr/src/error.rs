use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the statistics engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A statistic kind transitively depends on itself; raised while sealing.
    #[error("circular statistic dependency involving {0}")]
    Cycle(String),
    /// A multi-slot update arrived with a different arity than the first one.
    #[error("slot count mismatch: expected {expected}, got {got}")]
    SlotMismatch { expected: usize, got: usize },
}
