//! Voting deadline marker: a file holding one unix timestamp.
//!
//! Votes are accepted strictly before the deadline; tallying is allowed from
//! the deadline on. No marker means voting stays open.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use ballot_common::utils::fs::write_atomic;
use ballot_common::{BallotError, Result};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingDeadline {
    closes_at: i64,
}

impl VotingDeadline {
    pub fn at(closes_at: i64) -> Self {
        Self { closes_at }
    }

    /// Deadline `secs` seconds after `now`.
    pub fn after(now: i64, secs: u64) -> Self {
        Self {
            closes_at: now.saturating_add(secs.min(i64::MAX as u64) as i64),
        }
    }

    /// Parses an RFC 3339 timestamp such as `2026-11-03T20:00:00Z`.
    pub fn parse_rfc3339(s: &str) -> Result<Self> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| BallotError::Other(format!("invalid deadline {s:?}: {e}")))?;
        Ok(Self::at(dt.timestamp()))
    }

    pub fn closes_at(&self) -> i64 {
        self.closes_at
    }

    pub fn has_passed(&self, now: i64) -> bool {
        now >= self.closes_at
    }

    /// Reads the marker; `None` when no deadline has been set.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let closes_at = text
            .parse::<i64>()
            .map_err(|e| BallotError::Other(format!("deadline file {path:?}: {e}")))?;
        Ok(Some(Self::at(closes_at)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.closes_at.to_string().as_bytes())?;
        Ok(())
    }
}

impl fmt::Display for VotingDeadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.closes_at, 0) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "@{}", self.closes_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_has_passed_is_inclusive() {
        let d = VotingDeadline::at(1_000);
        assert!(!d.has_passed(999));
        assert!(d.has_passed(1_000));
        assert!(d.has_passed(1_001));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("voting_time.txt");
        assert_eq!(VotingDeadline::load(&path).unwrap(), None);

        let d = VotingDeadline::after(1_700_000_000, 30);
        d.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1700000030");
        assert_eq!(VotingDeadline::load(&path).unwrap(), Some(d));
    }

    #[test]
    fn test_garbage_marker_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("voting_time.txt");
        fs::write(&path, "soon").unwrap();
        assert!(VotingDeadline::load(&path).is_err());
    }

    #[test]
    fn test_rfc3339_and_display() {
        let d = VotingDeadline::parse_rfc3339("2026-11-03T20:00:00Z").unwrap();
        assert_eq!(d.closes_at(), 1_793_736_000);
        assert_eq!(d.to_string(), "2026-11-03T20:00:00+00:00");
    }
}
