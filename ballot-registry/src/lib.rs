//! Voter registry: a balanced search tree keyed by voter identifier that
//! records whether each registered voter has cast a ballot.

pub mod avl;
pub mod errors;
pub mod snapshot;
pub mod store;

pub use avl::{InsertOutcome, MarkOutcome, Registry, VoterNode};
pub use errors::{RegistryError, Result};
pub use store::RegistryStore;
