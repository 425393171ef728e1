use ballot_common::BallotError;
use thiserror::Error;

/// Errors raised by the voter registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Identifier validation and other shared failures.
    #[error(transparent)]
    Common(#[from] BallotError),

    /// The snapshot file does not decode to a valid registry.
    ///
    /// Raised for bad magic or version, a record count that disagrees with
    /// the file length, malformed records and duplicate keys.
    #[error("Corrupt registry snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
