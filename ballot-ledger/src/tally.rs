use std::collections::HashMap;

use ballot_common::{Candidate, Digest};
use serde::Serialize;
use tracing::{info, warn};

use crate::accumulator::MerkleAccumulator;
use crate::chain::VoteChain;
use crate::errors::TallyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateCount {
    pub candidate: Candidate,
    pub votes: u64,
}

/// Vote totals, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Root that passed the integrity check.
    pub merkle_root: Digest,
    pub counts: Vec<CandidateCount>,
    /// Votes whose candidate id matches no roster entry.
    pub excluded: u64,
    pub total_blocks: u64,
}

impl Tally {
    pub fn votes_for(&self, candidate_id: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|c| c.candidate.id == candidate_id)
            .map(|c| c.votes)
    }
}

/// Recomputes the Merkle root, compares it with the stored one and, only if
/// they match, counts one vote per block for the roster entry with the same
/// candidate id.
///
/// Blocks naming an unknown candidate are left out of every count. When the
/// roster repeats an id, the first entry receives the votes.
pub fn count_votes(chain: &VoteChain, candidates: &[Candidate]) -> Result<Tally, TallyError> {
    let stored = chain.merkle_root();
    let computed = MerkleAccumulator::compute_root(chain.blocks());
    if stored != computed {
        warn!("Integrity disrupted: stored root {} != computed root {}", stored, computed);
        return Err(TallyError::IntegrityMismatch { stored, computed });
    }
    info!("Integrity verified, Merkle root {}", computed);

    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(candidates.len());
    for (i, c) in candidates.iter().enumerate() {
        slots.entry(c.id.as_str()).or_insert(i);
    }

    let mut votes = vec![0u64; candidates.len()];
    let mut excluded = 0u64;
    for block in chain.blocks() {
        match slots.get(block.candidate_id()) {
            Some(&i) => votes[i] += 1,
            None => excluded += 1,
        }
    }

    let counts = candidates
        .iter()
        .cloned()
        .zip(votes)
        .map(|(candidate, votes)| CandidateCount { candidate, votes })
        .collect();

    Ok(Tally {
        merkle_root: computed,
        counts,
        excluded,
        total_blocks: chain.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Candidate> {
        vec![Candidate::new("C1", "Alice"), Candidate::new("C2", "Bob")]
    }

    fn cast(votes: &[(&str, &str)]) -> VoteChain {
        let mut chain = VoteChain::new(64);
        for (voter, cand) in votes {
            chain.append(voter, cand).unwrap();
        }
        chain
    }

    #[test]
    fn test_counts_per_candidate() {
        let chain = cast(&[("V1", "C1"), ("V2", "C2"), ("V3", "C1")]);
        let tally = count_votes(&chain, &roster()).unwrap();

        assert_eq!(tally.votes_for("C1"), Some(2));
        assert_eq!(tally.votes_for("C2"), Some(1));
        assert_eq!(tally.excluded, 0);
        assert_eq!(tally.total_blocks, 3);
        assert_eq!(tally.merkle_root, chain.merkle_root());
    }

    #[test]
    fn test_unknown_candidate_is_excluded_silently() {
        let chain = cast(&[("V1", "C1"), ("V2", "NOPE"), ("V3", "C2")]);
        let tally = count_votes(&chain, &roster()).unwrap();

        assert_eq!(tally.votes_for("C1"), Some(1));
        assert_eq!(tally.votes_for("C2"), Some(1));
        assert_eq!(tally.votes_for("NOPE"), None);
        assert_eq!(tally.excluded, 1);
    }

    #[test]
    fn test_empty_ledger_counts_zero() {
        let tally = count_votes(&VoteChain::new(4), &roster()).unwrap();
        assert!(tally.counts.iter().all(|c| c.votes == 0));
        assert_eq!(tally.merkle_root, Digest::ZERO);
    }

    #[test]
    fn test_duplicate_roster_ids_credit_first_entry() {
        let chain = cast(&[("V1", "C1")]);
        let roster = vec![Candidate::new("C1", "First"), Candidate::new("C1", "Second")];
        let tally = count_votes(&chain, &roster).unwrap();
        assert_eq!(tally.counts[0].votes, 1);
        assert_eq!(tally.counts[1].votes, 0);
    }

    #[test]
    fn test_json_report_uses_hex_root() {
        let chain = cast(&[("V1", "C1")]);
        let tally = count_votes(&chain, &roster()).unwrap();
        let json = serde_json::to_value(&tally).unwrap();
        assert_eq!(json["merkle_root"], chain.merkle_root().to_hex());
        assert_eq!(json["counts"][0]["candidate"]["name"], "Alice");
        assert_eq!(json["counts"][0]["votes"], 1);
    }

    #[test]
    fn test_tampered_payload_refuses_to_count() {
        let mut chain = cast(&[("V1", "C1"), ("V2", "C2"), ("V3", "C1")]);
        chain.blocks[1].candidate_id = "C1".to_string();

        match count_votes(&chain, &roster()) {
            Err(TallyError::IntegrityMismatch { stored, computed }) => {
                assert_eq!(stored, chain.merkle_root());
                assert_ne!(stored, computed);
            }
            other => panic!("expected integrity mismatch, got {other:?}"),
        }
    }
}
