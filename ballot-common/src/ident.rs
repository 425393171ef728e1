//! Identifier bounds.
//!
//! Voter and candidate identifiers are bounded byte strings. Values that
//! break the bound are rejected, never truncated.

use std::fmt;

use crate::error::{BallotError, Result};

/// Maximum identifier length in bytes.
pub const MAX_ID_LEN: usize = 32;

/// Which kind of identifier is being validated, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Voter,
    Candidate,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Voter => write!(f, "voter id"),
            IdKind::Candidate => write!(f, "candidate id"),
        }
    }
}

/// Checks that `value` is non-empty, at most [`MAX_ID_LEN`] bytes and free
/// of NUL bytes.
pub fn validate_id(kind: IdKind, value: &str) -> Result<()> {
    let reason = if value.is_empty() {
        "must not be empty"
    } else if value.len() > MAX_ID_LEN {
        "exceeds 32 bytes"
    } else if value.as_bytes().contains(&0) {
        "must not contain NUL bytes"
    } else {
        return Ok(());
    };

    Err(BallotError::InvalidIdentifier {
        kind,
        value: value.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounded_ids() {
        assert!(validate_id(IdKind::Voter, "V1").is_ok());
        assert!(validate_id(IdKind::Voter, &"x".repeat(MAX_ID_LEN)).is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            validate_id(IdKind::Candidate, ""),
            Err(BallotError::InvalidIdentifier { kind: IdKind::Candidate, .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_instead_of_truncating() {
        let long = "x".repeat(MAX_ID_LEN + 1);
        let err = validate_id(IdKind::Voter, &long).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_rejects_nul() {
        assert!(validate_id(IdKind::Voter, "a\0b").is_err());
    }
}
