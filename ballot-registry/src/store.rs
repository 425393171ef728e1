use std::path::{Path, PathBuf};

use ballot_common::utils::fs::{read_or_empty, write_atomic};
use tracing::{debug, info};

use crate::avl::{InsertOutcome, MarkOutcome, Registry, VoterNode};
use crate::errors::Result;
use crate::snapshot;

/// A [`Registry`] bound to its snapshot file.
///
/// Every effective mutation rewrites the whole snapshot. The write is
/// atomic, but if it fails the in-memory change is kept and the error is
/// returned to the caller.
#[derive(Debug)]
pub struct RegistryStore {
    registry: Registry,
    path: PathBuf,
}

impl RegistryStore {
    /// Loads the snapshot at `path`; a missing or empty file opens an
    /// empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = read_or_empty(&path)?;
        let registry = snapshot::decode(&bytes)?;
        info!(
            "Loaded {} voters ({} voted) from {:?}",
            registry.len(),
            registry.voted_count(),
            path
        );
        Ok(Self { registry, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn find(&self, voter_id: &str) -> Option<&VoterNode> {
        self.registry.find(voter_id)
    }

    /// Registers a voter and persists if the key was new.
    pub fn insert(&mut self, voter_id: &str) -> Result<InsertOutcome> {
        let outcome = self.registry.insert(voter_id)?;
        match outcome {
            InsertOutcome::Inserted => {
                self.persist()?;
                info!("Registered voter {}", voter_id);
            }
            InsertOutcome::AlreadyPresent => debug!("Voter {} already registered", voter_id),
        }
        Ok(outcome)
    }

    /// Marks a voter as having voted and persists if the flag flipped.
    pub fn mark_voted(&mut self, voter_id: &str) -> Result<MarkOutcome> {
        let outcome = self.registry.mark_voted(voter_id);
        if outcome == MarkOutcome::MarkedNow {
            self.persist()?;
            info!("Voter {} marked as voted", voter_id);
        }
        Ok(outcome)
    }

    /// Rewrites the snapshot file from the in-memory tree.
    pub fn persist(&self) -> Result<()> {
        write_atomic(&self.path, &snapshot::encode(&self.registry))?;
        debug!("Registry snapshot written to {:?}", self.path);
        Ok(())
    }
}
