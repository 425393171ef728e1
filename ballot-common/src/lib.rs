//! Shared building blocks for the ballot ledger workspace.
//!
//! Hashing, Merkle root construction, identifier bounds, the shared error
//! type and small filesystem/time helpers used by the registry, the ledger
//! and the command line front-end.

pub mod candidate;
pub mod crypto;
pub mod error;
pub mod ident;
pub mod utils;

pub use candidate::Candidate;
pub use crypto::hash::Digest;
pub use error::{BallotError, Result};
