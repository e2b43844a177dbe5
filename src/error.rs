use thiserror::Error;

/// Errors raised by ledger, mining and policy operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    /// An operation needed a tip but the chain has no genesis block.
    #[error("chain is empty (no genesis block)")]
    EmptyChain,

    /// Mining was stopped through its cancel token before a digest met the target.
    #[error("mining of block #{index} cancelled after {attempts} attempts")]
    MiningCancelled { index: u64, attempts: u64 },

    #[error("mining worker exited without reporting a result")]
    MiningWorkerLost,

    /// The requested number of leading zeros exceeds the digest length.
    #[error("difficulty {difficulty} exceeds digest length {max}")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },

    #[error("block index {index} out of range (chain length {len})")]
    IndexOutOfRange { index: u64, len: usize },

    #[error("flip probability {0} must be within [0, 1]")]
    InvalidProbability(f64),
}

/// Errors raised while loading `AppConfig` from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("unknown hash algorithm: {0:?} (expected sha256 or sha512)")]
    UnknownAlgorithm(String),

    #[error("FLIP_PROBABILITY must be within [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),

    #[error("ADMINS must name at least one admin")]
    NoAdmins,
}
