//! One election: the voter registry and the vote ledger opened together from
//! a [`BallotConfig`] and driven by a single owner.

use ballot_common::ident::{validate_id, IdKind};
use ballot_common::utils::fs::truncate;
use ballot_common::utils::time::current_time;
use ballot_common::{BallotError, Candidate, Digest};
use ballot_ledger::{ChainReport, Ledger, LedgerError, Tally, TallyError};
use ballot_registry::{InsertOutcome, MarkOutcome, RegistryError, RegistryStore, VoterNode};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::config::BallotConfig;
use crate::deadline::VotingDeadline;
use crate::roster;

#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("Voter {0} is not registered")]
    NotRegistered(String),

    #[error("Voter {0} has already voted")]
    AlreadyVoted(String),

    #[error("Voting closed at {0}")]
    VotingClosed(VotingDeadline),

    #[error("Voting is open until {0}; tally not allowed yet")]
    VotingStillOpen(VotingDeadline),

    #[error("No voting deadline has been set; tally not allowed yet")]
    NoDeadline,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Tally(#[from] TallyError),

    #[error(transparent)]
    Common(#[from] BallotError),
}

pub type Result<T> = std::result::Result<T, ElectionError>;

/// What a voter gets back after a successful vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub position: usize,
    pub chain_hash: Digest,
    pub merkle_root: Digest,
}

#[derive(Debug)]
pub struct Election {
    config: BallotConfig,
    registry: RegistryStore,
    ledger: Ledger,
}

impl Election {
    /// Opens both persisted structures; missing files start empty.
    pub fn open(config: BallotConfig) -> Result<Self> {
        config.validate()?;
        let registry = RegistryStore::open(config.registry_path())?;
        let ledger = Ledger::open(config.ledger_path(), config.ledger_capacity)?;
        Ok(Self {
            config,
            registry,
            ledger,
        })
    }

    pub fn config(&self) -> &BallotConfig {
        &self.config
    }

    pub fn registry(&self) -> &RegistryStore {
        &self.registry
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn deadline(&self) -> Result<Option<VotingDeadline>> {
        Ok(VotingDeadline::load(&self.config.deadline_path())?)
    }

    pub fn register(&mut self, voter_id: &str) -> Result<InsertOutcome> {
        Ok(self.registry.insert(voter_id)?)
    }

    pub fn voter(&self, voter_id: &str) -> Option<&VoterNode> {
        self.registry.find(voter_id)
    }

    pub fn cast_vote(&mut self, voter_id: &str, candidate_id: &str) -> Result<VoteReceipt> {
        self.cast_vote_at(voter_id, candidate_id, current_time())
    }

    /// Records a vote as of `now` (unix seconds).
    ///
    /// Checks run before anything is written: identifiers, deadline,
    /// registration, prior vote and ledger capacity. The block is then
    /// appended and the voter marked, in that order.
    pub fn cast_vote_at(&mut self, voter_id: &str, candidate_id: &str, now: i64) -> Result<VoteReceipt> {
        validate_id(IdKind::Voter, voter_id)?;
        validate_id(IdKind::Candidate, candidate_id)?;

        if let Some(deadline) = self.deadline()? {
            if deadline.has_passed(now) {
                return Err(ElectionError::VotingClosed(deadline));
            }
        }

        match self.registry.find(voter_id) {
            None => return Err(ElectionError::NotRegistered(voter_id.to_string())),
            Some(v) if v.has_voted() => return Err(ElectionError::AlreadyVoted(voter_id.to_string())),
            Some(_) => {}
        }

        let block = self.ledger.append(voter_id, candidate_id)?;
        let chain_hash = block.chain_hash();
        let position = self.ledger.len() - 1;

        match self.registry.mark_voted(voter_id)? {
            MarkOutcome::MarkedNow => {}
            other => warn!("Voter {} unexpectedly marked as {:?} after ledger append", voter_id, other),
        }

        Ok(VoteReceipt {
            position,
            chain_hash,
            merkle_root: self.ledger.merkle_root(),
        })
    }

    pub fn verify(&self) -> ChainReport {
        self.ledger.verify()
    }

    pub fn roster(&self) -> Result<Vec<Candidate>> {
        Ok(roster::load_roster(&self.config.roster_path())?)
    }

    pub fn tally(&self, force: bool) -> Result<Tally> {
        self.tally_at(current_time(), force)
    }

    /// Counts votes against the roster file.
    ///
    /// Unless `force` is set, the deadline must exist and have passed at
    /// `now`.
    pub fn tally_at(&self, now: i64, force: bool) -> Result<Tally> {
        if !force {
            match self.deadline()? {
                None => return Err(ElectionError::NoDeadline),
                Some(d) if !d.has_passed(now) => return Err(ElectionError::VotingStillOpen(d)),
                Some(_) => {}
            }
        }
        let candidates = self.roster()?;
        Ok(self.ledger.count_votes(&candidates)?)
    }

    /// Empties the registry and ledger files named by `config`.
    ///
    /// The files are truncated without being decoded, so a corrupt or
    /// oversized ledger can still be cleared. The roster and the deadline
    /// marker are left alone.
    pub fn reset(config: &BallotConfig) -> Result<()> {
        truncate(&config.ledger_path()).map_err(BallotError::from)?;
        truncate(&config.registry_path()).map_err(BallotError::from)?;
        warn!("Registry and ledger data destroyed under {:?}", config.data_dir);
        Ok(())
    }
}
