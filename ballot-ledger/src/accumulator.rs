use ballot_common::crypto::merkle::calculate_merkle_root;
use ballot_common::Digest;

use crate::block::VoteBlock;
use crate::errors::{LedgerError, Result};

/// Bounded cache of block content hashes and the Merkle root over them.
///
/// There is no incremental update: every rebuild rehashes all blocks.
#[derive(Debug, Clone)]
pub struct MerkleAccumulator {
    capacity: usize,
    leaves: Vec<Digest>,
    root: Digest,
}

impl MerkleAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            leaves: Vec::new(),
            root: Digest::ZERO,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached content hashes, one per block in ledger order.
    pub fn leaves(&self) -> &[Digest] {
        &self.leaves
    }

    /// Root produced by the last rebuild.
    pub fn root(&self) -> Digest {
        self.root
    }

    /// Recomputes every content hash and the root from `blocks`.
    ///
    /// Fails without touching the cache when `blocks` exceeds the capacity.
    pub fn rebuild(&mut self, blocks: &[VoteBlock]) -> Result<Digest> {
        if blocks.len() > self.capacity {
            return Err(LedgerError::CapacityExhausted {
                capacity: self.capacity,
            });
        }
        self.leaves = blocks.iter().map(VoteBlock::content_hash).collect();
        self.root = calculate_merkle_root(&self.leaves);
        Ok(self.root)
    }

    /// Root over `blocks` computed from scratch, bypassing any cache.
    pub fn compute_root(blocks: &[VoteBlock]) -> Digest {
        let leaves: Vec<Digest> = blocks.iter().map(VoteBlock::content_hash).collect();
        calculate_merkle_root(&leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::genesis_chain_hash;
    use ballot_common::crypto::merkle::hash_pair;

    fn blocks(n: usize) -> Vec<VoteBlock> {
        let mut out: Vec<VoteBlock> = Vec::new();
        for i in 0..n {
            let chain = out
                .last()
                .map_or_else(genesis_chain_hash, VoteBlock::successor_chain_hash);
            out.push(VoteBlock::new(&format!("V{i}"), "C1", chain));
        }
        out
    }

    #[test]
    fn test_rebuild_matches_manual_tree() {
        let b = blocks(3);
        let mut acc = MerkleAccumulator::new(8);
        let root = acc.rebuild(&b).unwrap();

        let h: Vec<Digest> = b.iter().map(VoteBlock::content_hash).collect();
        let expected = hash_pair(&hash_pair(&h[0], &h[1]), &hash_pair(&h[2], &h[2]));
        assert_eq!(root, expected);
        assert_eq!(acc.leaves(), h.as_slice());
        assert_eq!(MerkleAccumulator::compute_root(&b), root);
    }

    #[test]
    fn test_rebuild_over_capacity_keeps_cache() {
        let mut acc = MerkleAccumulator::new(2);
        let first = acc.rebuild(&blocks(2)).unwrap();

        let err = acc.rebuild(&blocks(3)).unwrap_err();
        assert!(matches!(err, LedgerError::CapacityExhausted { capacity: 2 }));
        assert_eq!(acc.root(), first);
        assert_eq!(acc.leaves().len(), 2);
    }

    #[test]
    fn test_empty_root_is_zero() {
        let mut acc = MerkleAccumulator::new(4);
        assert_eq!(acc.rebuild(&[]).unwrap(), Digest::ZERO);
    }
}
