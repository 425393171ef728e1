//! Append-only vote ledger.
//!
//! Blocks are chained to their predecessor by a SHA-256 chain hash and the
//! whole ledger is summarized by a Merkle root over per-block content
//! hashes. The root is never persisted; it is recomputed from the blocks on
//! every append and every load.

pub mod accumulator;
pub mod binlog;
pub mod block;
pub mod chain;
pub mod errors;
pub mod tally;
pub mod verify;

use std::path::{Path, PathBuf};

use ballot_common::{Candidate, Digest};
use tracing::{info, warn};

pub use accumulator::MerkleAccumulator;
pub use block::VoteBlock;
pub use chain::VoteChain;
pub use errors::{LedgerError, Result, TallyError};
pub use tally::{CandidateCount, Tally};
pub use verify::{ChainReport, LinkVerdict};

/// Default block capacity of the ledger and its content-hash cache.
pub const DEFAULT_CAPACITY: usize = 64;

/// A [`VoteChain`] backed by its binlog file.
#[derive(Debug)]
pub struct Ledger {
    chain: VoteChain,
    binlog: binlog::Binlog,
}

impl Ledger {
    /// Loads the ledger stored at `path`.
    ///
    /// A missing or empty file opens an empty ledger. The Merkle root is
    /// recomputed from the loaded blocks.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        let binlog = binlog::Binlog::new(path)?;
        let blocks = binlog.read_all()?;
        let chain = VoteChain::from_blocks(blocks, capacity)?;
        info!(
            "Loaded {} blocks from {:?}, Merkle root {}",
            chain.len(),
            binlog.path(),
            chain.merkle_root()
        );
        Ok(Self { chain, binlog })
    }

    pub fn path(&self) -> &Path {
        self.binlog.path()
    }

    pub fn chain(&self) -> &VoteChain {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.chain.is_full()
    }

    pub fn merkle_root(&self) -> Digest {
        self.chain.merkle_root()
    }

    /// Appends a vote and persists it.
    ///
    /// The record reaches the file before the block is linked in memory, so
    /// any failure leaves both untouched.
    pub fn append(&mut self, voter_id: &str, candidate_id: &str) -> Result<&VoteBlock> {
        let block = self.chain.prepare(voter_id, candidate_id)?;
        self.binlog.append(&block)?;
        let position = self.chain.commit(block)?;
        info!(
            "Vote by {} recorded at position {}, Merkle root now {}",
            voter_id,
            position,
            self.chain.merkle_root()
        );
        Ok(&self.chain.blocks()[position])
    }

    pub fn verify(&self) -> ChainReport {
        let report = self.chain.verify();
        if !report.verified {
            warn!("{} altered links detected in {:?}", report.broken_count(), self.path());
        }
        report
    }

    /// Checks the Merkle root and counts votes per roster entry.
    pub fn count_votes(&self, candidates: &[Candidate]) -> std::result::Result<Tally, TallyError> {
        tally::count_votes(&self.chain, candidates)
    }
}
