use thiserror::Error;

use crate::ident::IdKind;

/// Errors shared by every crate in the workspace.
#[derive(Debug, Error)]
pub enum BallotError {
    /// An identifier failed validation before any state was touched.
    #[error("Invalid {kind} `{value}`: {reason}")]
    InvalidIdentifier {
        kind: IdKind,
        value: String,
        reason: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Other: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BallotError>;
