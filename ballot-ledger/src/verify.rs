use ballot_common::Digest;
use serde::Serialize;
use tracing::debug;

use crate::block::VoteBlock;

/// Verdict for the link between a block and its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkVerdict {
    /// Zero-based position of the checked block; always at least 1.
    pub position: usize,
    pub voter_id: String,
    pub candidate_id: String,
    /// Chain hash recomputed from the predecessor.
    pub expected: Digest,
    /// Chain hash stored in the block.
    pub stored: Digest,
    pub intact: bool,
}

/// Outcome of walking the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub links: Vec<LinkVerdict>,
    /// `true` when every link is intact.
    pub verified: bool,
}

impl ChainReport {
    pub fn broken_links(&self) -> impl Iterator<Item = &LinkVerdict> {
        self.links.iter().filter(|l| !l.intact)
    }

    pub fn broken_count(&self) -> usize {
        self.broken_links().count()
    }
}

/// Checks every link from the second block on.
///
/// The walk never stops early, so each altered link is reported on its own.
pub fn verify_blocks(blocks: &[VoteBlock]) -> ChainReport {
    let links: Vec<LinkVerdict> = blocks
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let expected = prev.successor_chain_hash();
            if expected != cur.chain_hash {
                debug!(
                    "Link {} broken: expected {}, stored {}",
                    i + 1,
                    expected,
                    cur.chain_hash
                );
            }
            LinkVerdict {
                position: i + 1,
                voter_id: cur.voter_id.clone(),
                candidate_id: cur.candidate_id.clone(),
                expected,
                stored: cur.chain_hash,
                intact: expected == cur.chain_hash,
            }
        })
        .collect();

    let verified = links.iter().all(|l| l.intact);
    ChainReport { links, verified }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::VoteChain;

    #[test]
    fn test_broken_link_reports_both_hashes() {
        let mut chain = VoteChain::new(8);
        chain.append("V1", "C1").unwrap();
        chain.append("V2", "C2").unwrap();
        let mut blocks = chain.blocks().to_vec();
        blocks[0].voter_id = "V9".to_string();

        let report = verify_blocks(&blocks);
        assert!(!report.verified);
        let link = &report.links[0];
        assert_eq!(link.position, 1);
        assert!(!link.intact);
        assert_eq!(link.stored, blocks[1].chain_hash());
        assert_eq!(link.expected, blocks[0].content_hash());
        assert_ne!(link.expected, link.stored);
    }
}
