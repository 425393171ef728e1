use ballot_common::{BallotError, Digest};
use thiserror::Error;

/// Errors raised while appending to, loading or persisting the ledger.
///
/// A failed append never leaves a partial block behind.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Identifier validation and other shared failures.
    #[error(transparent)]
    Common(#[from] BallotError),

    /// The ledger already holds `capacity` blocks.
    #[error("Ledger is full: capacity of {capacity} blocks reached")]
    CapacityExhausted { capacity: usize },

    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// The ledger file could not be decoded.
    #[error("Corrupt ledger log: {0}")]
    CorruptLog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a tally refuses to count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TallyError {
    /// The Merkle root recomputed from the blocks differs from the one the
    /// ledger recorded at its last append.
    #[error("Integrity check failed: stored Merkle root {stored} does not match computed root {computed}")]
    IntegrityMismatch { stored: Digest, computed: Digest },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
