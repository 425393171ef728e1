use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ballot")]
#[command(about = "Tamper-evident vote ledger with a balanced voter registry")]
pub struct Cli {
    /// JSON configuration file; defaults apply when it does not exist
    #[arg(long, global = true, value_name = "FILE", default_value = "ballot.json")]
    pub config: PathBuf,

    /// Override the configured data directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register a voter
    Register {
        #[arg(value_name = "VOTER_ID")]
        voter_id: String,
    },
    /// Cast a vote for a candidate
    Vote {
        #[arg(value_name = "VOTER_ID")]
        voter_id: String,
        #[arg(value_name = "CANDIDATE_ID")]
        candidate_id: String,
    },
    /// Show whether a voter is registered and has voted
    Status {
        #[arg(value_name = "VOTER_ID")]
        voter_id: String,
    },
    /// List registered voters in key order
    Voters {
        /// Dump the snapshot records in file order instead
        #[arg(long)]
        raw: bool,
    },
    /// Check every link of the hash chain
    Verify,
    /// Print the current Merkle root
    Root,
    /// Check ledger integrity and count votes per candidate
    Tally {
        /// Count even if the voting deadline has not passed
        #[arg(long)]
        force: bool,
    },
    /// Manage the candidate roster
    Candidate {
        #[command(subcommand)]
        action: CandidateAction,
    },
    /// Manage the voting deadline
    Deadline {
        #[command(subcommand)]
        action: DeadlineAction,
    },
    /// Destroy all registry and ledger data
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Write the effective configuration to the config file
    InitConfig,
}

impl Commands {
    /// Whether the command opens or changes election data and so belongs in
    /// the audit log.
    pub fn writes_audit_log(&self) -> bool {
        !matches!(
            self,
            Commands::InitConfig
                | Commands::Candidate {
                    action: CandidateAction::List
                }
                | Commands::Deadline {
                    action: DeadlineAction::Show
                }
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum CandidateAction {
    /// Add a candidate with a generated id
    Add {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// List candidates
    List,
    /// Remove every candidate
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum DeadlineAction {
    /// Set the moment voting closes
    Set {
        /// Close voting this many seconds from now
        #[arg(long = "in", value_name = "SECONDS", conflicts_with = "at", required_unless_present = "at")]
        in_secs: Option<u64>,
        /// Close voting at an RFC 3339 timestamp
        #[arg(long, value_name = "TIMESTAMP")]
        at: Option<String>,
    },
    /// Show the deadline and whether it has passed
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_vote() {
        let cli = Cli::try_parse_from(["ballot", "--json", "vote", "V1", "C1"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Vote { voter_id, candidate_id } => {
                assert_eq!(voter_id, "V1");
                assert_eq!(candidate_id, "C1");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_deadline_set_requires_one_source() {
        assert!(Cli::try_parse_from(["ballot", "deadline", "set"]).is_err());
        assert!(Cli::try_parse_from(["ballot", "deadline", "set", "--in", "30", "--at", "x"]).is_err());
        assert!(Cli::try_parse_from(["ballot", "deadline", "set", "--in", "30"]).is_ok());
    }

    #[test]
    fn test_read_only_commands_skip_audit_log() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;

        assert!(!parse(&["ballot", "init-config"]).writes_audit_log());
        assert!(!parse(&["ballot", "candidate", "list"]).writes_audit_log());
        assert!(!parse(&["ballot", "deadline", "show"]).writes_audit_log());

        assert!(parse(&["ballot", "vote", "V1", "C1"]).writes_audit_log());
        assert!(parse(&["ballot", "candidate", "add", "Alice"]).writes_audit_log());
        assert!(parse(&["ballot", "reset", "--yes"]).writes_audit_log());
    }
}
