//! Command line front-end for the ballot ledger.
//!
//! Owns everything around the core structures: configuration, logging,
//! the candidate roster file, the voting deadline marker and the
//! [`session::Election`] that keeps the registry and the ledger in step.

pub mod cli;
pub mod commands;
pub mod config;
pub mod deadline;
pub mod logging;
pub mod roster;
pub mod session;

pub use config::BallotConfig;
pub use session::{Election, ElectionError, VoteReceipt};
