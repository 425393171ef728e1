use ballot_common::ident::{validate_id, IdKind};
use ballot_common::Digest;
use tracing::{debug, warn};

use crate::accumulator::MerkleAccumulator;
use crate::block::{genesis_chain_hash, VoteBlock};
use crate::errors::{LedgerError, Result};
use crate::verify::{verify_blocks, ChainReport};

/// In-memory hash chain of vote blocks with its Merkle accumulator.
#[derive(Debug, Clone)]
pub struct VoteChain {
    pub(crate) blocks: Vec<VoteBlock>,
    accumulator: MerkleAccumulator,
    merkle_root: Digest,
}

impl VoteChain {
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            accumulator: MerkleAccumulator::new(capacity),
            merkle_root: Digest::ZERO,
        }
    }

    /// Builds a chain from already-chained blocks, e.g. read back from disk.
    ///
    /// Chain hashes are taken as stored and only checked by
    /// [`verify`](Self::verify); the Merkle root is recomputed here.
    pub fn from_blocks(blocks: Vec<VoteBlock>, capacity: usize) -> Result<Self> {
        let mut accumulator = MerkleAccumulator::new(capacity);
        let merkle_root = accumulator.rebuild(&blocks)?;
        Ok(Self {
            blocks,
            accumulator,
            merkle_root,
        })
    }

    pub fn capacity(&self) -> usize {
        self.accumulator.capacity()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.capacity()
    }

    pub fn blocks(&self) -> &[VoteBlock] {
        &self.blocks
    }

    pub fn tail(&self) -> Option<&VoteBlock> {
        self.blocks.last()
    }

    /// Merkle root recorded at the last append or load.
    pub fn merkle_root(&self) -> Digest {
        self.merkle_root
    }

    /// Cached content hashes, in block order.
    pub fn content_hashes(&self) -> &[Digest] {
        self.accumulator.leaves()
    }

    /// Merkle root recomputed from the current blocks.
    pub fn recompute_root(&self) -> Digest {
        MerkleAccumulator::compute_root(&self.blocks)
    }

    /// Validates a vote and builds the block that would follow the tail.
    ///
    /// Nothing is linked yet; see [`commit`](Self::commit).
    pub fn prepare(&mut self, voter_id: &str, candidate_id: &str) -> Result<VoteBlock> {
        validate_id(IdKind::Voter, voter_id)?;
        validate_id(IdKind::Candidate, candidate_id)?;

        if self.is_full() {
            warn!("Ledger capacity of {} blocks exhausted", self.capacity());
            return Err(LedgerError::CapacityExhausted {
                capacity: self.capacity(),
            });
        }
        self.blocks
            .try_reserve(1)
            .map_err(|e| LedgerError::Allocation(e.to_string()))?;

        let chain_hash = self
            .tail()
            .map_or_else(genesis_chain_hash, VoteBlock::successor_chain_hash);
        Ok(VoteBlock::new(voter_id, candidate_id, chain_hash))
    }

    /// Links a prepared block at the tail and refreshes the Merkle root.
    ///
    /// Returns the position of the new block.
    pub fn commit(&mut self, block: VoteBlock) -> Result<usize> {
        self.blocks.push(block);
        match self.accumulator.rebuild(&self.blocks) {
            Ok(root) => {
                self.merkle_root = root;
                debug!("Merkle root rebuilt over {} blocks: {}", self.blocks.len(), root);
                Ok(self.blocks.len() - 1)
            }
            Err(e) => {
                self.blocks.pop();
                Err(e)
            }
        }
    }

    /// Appends a vote in memory only.
    pub fn append(&mut self, voter_id: &str, candidate_id: &str) -> Result<&VoteBlock> {
        let block = self.prepare(voter_id, candidate_id)?;
        let position = self.commit(block)?;
        Ok(&self.blocks[position])
    }

    pub fn verify(&self) -> ChainReport {
        verify_blocks(&self.blocks)
    }
}
