use ballot_common::crypto::hash::{digest, digest_parts};
use ballot_common::Digest;
use serde::{Deserialize, Serialize};

/// One cast vote.
///
/// `chain_hash` commits to the previous block, not to this one: the first
/// block carries the digest of the empty input and every later block
/// carries the content hash of its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBlock {
    pub(crate) voter_id: String,
    pub(crate) candidate_id: String,
    pub(crate) chain_hash: Digest,
}

impl VoteBlock {
    pub(crate) fn new(voter_id: &str, candidate_id: &str, chain_hash: Digest) -> Self {
        Self {
            voter_id: voter_id.to_string(),
            candidate_id: candidate_id.to_string(),
            chain_hash,
        }
    }

    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    pub fn chain_hash(&self) -> Digest {
        self.chain_hash
    }

    /// `H(voter_id ++ candidate_id ++ chain_hash)`, the Merkle leaf for this
    /// block.
    pub fn content_hash(&self) -> Digest {
        digest_parts(&[
            self.voter_id.as_bytes(),
            self.candidate_id.as_bytes(),
            self.chain_hash.as_bytes(),
        ])
    }

    /// The chain hash a block appended after this one must carry.
    ///
    /// It covers the same bytes as [`content_hash`](Self::content_hash).
    pub fn successor_chain_hash(&self) -> Digest {
        self.content_hash()
    }
}

/// Chain hash of the first block: the digest of the empty input.
pub fn genesis_chain_hash() -> Digest {
    digest(b"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_empty_digest() {
        assert_eq!(
            genesis_chain_hash().to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_content_hash_covers_plain_concatenation() {
        let b = VoteBlock::new("V1", "C1", genesis_chain_hash());
        let mut bytes = b"V1C1".to_vec();
        bytes.extend_from_slice(genesis_chain_hash().as_bytes());
        assert_eq!(b.content_hash(), digest(&bytes));
    }

    #[test]
    fn test_content_hash_depends_on_every_field() {
        let base = VoteBlock::new("V1", "C1", genesis_chain_hash());
        let other_voter = VoteBlock::new("V2", "C1", genesis_chain_hash());
        let other_cand = VoteBlock::new("V1", "C2", genesis_chain_hash());
        let other_chain = VoteBlock::new("V1", "C1", digest(b"x"));

        assert_ne!(base.content_hash(), other_voter.content_hash());
        assert_ne!(base.content_hash(), other_cand.content_hash());
        assert_ne!(base.content_hash(), other_chain.content_hash());
    }
}
