use std::error::Error;

use ballot_common::utils::fs::read_or_empty;
use ballot_common::utils::time::current_time;
use ballot_registry::{snapshot, InsertOutcome};
use serde::Serialize;

use crate::cli::{CandidateAction, Cli, Commands, DeadlineAction};
use crate::config::BallotConfig;
use crate::deadline::VotingDeadline;
use crate::roster;
use crate::session::Election;

#[derive(Serialize)]
struct VoterStatus<'a> {
    voter_id: &'a str,
    registered: bool,
    has_voted: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs one parsed command against the election described by `config`.
pub fn run(cli: Cli, config: BallotConfig) -> Result<(), Box<dyn Error>> {
    let json = cli.json;

    match cli.command {
        Commands::InitConfig => {
            config.save_to_file(&cli.config)?;
            println!("Configuration written to {}", cli.config.display());
        }
        Commands::Register { voter_id } => {
            let mut election = Election::open(config)?;
            match election.register(&voter_id)? {
                InsertOutcome::Inserted => println!("Voter {voter_id} registered"),
                InsertOutcome::AlreadyPresent => println!("Voter {voter_id} was already registered"),
            }
        }
        Commands::Vote { voter_id, candidate_id } => {
            let mut election = Election::open(config)?;
            let receipt = election.cast_vote(&voter_id, &candidate_id)?;
            if json {
                print_json(&receipt)?;
            } else {
                println!("Vote cast successfully (block {})", receipt.position);
                println!("Chain hash:  {}", receipt.chain_hash);
                println!("Merkle root: {}", receipt.merkle_root);
            }
        }
        Commands::Status { voter_id } => {
            let election = Election::open(config)?;
            let node = election.voter(&voter_id);
            let status = VoterStatus {
                voter_id: &voter_id,
                registered: node.is_some(),
                has_voted: node.is_some_and(|n| n.has_voted()),
            };
            if json {
                print_json(&status)?;
            } else if !status.registered {
                println!("Voter {voter_id} is not registered");
            } else {
                println!("Voter ID: {}, Voted: {}", voter_id, u8::from(status.has_voted));
            }
        }
        Commands::Voters { raw } => {
            let election = Election::open(config)?;
            if raw {
                let bytes = read_or_empty(election.registry().path())?;
                for rec in snapshot::read_records(&bytes)? {
                    println!("Voter ID: {}, Voted: {}", rec.voter_id, u8::from(rec.has_voted));
                }
            } else {
                let reg = election.registry().registry();
                for node in reg.iter() {
                    println!("Voter ID: {}, Voted: {}", node.voter_id(), u8::from(node.has_voted()));
                }
                println!(
                    "{} voters, {} voted, tree height {}",
                    reg.len(),
                    reg.voted_count(),
                    reg.height()
                );
            }
        }
        Commands::Verify => {
            let election = Election::open(config)?;
            let report = election.verify();
            if json {
                print_json(&report)?;
            } else if election.ledger().is_empty() {
                println!("Ledger is empty.");
            } else {
                for link in &report.links {
                    println!(
                        "{}\t[{}]-[{}]\t{} - {}\t{}",
                        link.position,
                        link.voter_id,
                        link.candidate_id,
                        link.expected,
                        link.stored,
                        if link.intact { "Verified" } else { "Alteration detected" }
                    );
                }
                if report.verified {
                    println!("Ledger verified: {} blocks intact", election.ledger().len());
                } else {
                    println!("Ledger altered: {} broken links", report.broken_count());
                }
            }
            if !report.verified {
                return Err("ledger verification failed".into());
            }
        }
        Commands::Root => {
            let election = Election::open(config)?;
            println!("Current Merkle Root: {}", election.ledger().merkle_root());
        }
        Commands::Tally { force } => {
            let election = Election::open(config)?;
            let tally = election.tally(force)?;
            if json {
                print_json(&tally)?;
            } else {
                println!("Integrity verified (Merkle root {})", tally.merkle_root);
                println!("Vote counts per candidate:");
                for (i, count) in tally.counts.iter().enumerate() {
                    println!(
                        "Candidate {} ({}, {}): {} votes",
                        i + 1,
                        count.candidate.id,
                        count.candidate.name,
                        count.votes
                    );
                }
                if tally.excluded > 0 {
                    println!("{} votes for unlisted candidates were not counted", tally.excluded);
                }
            }
        }
        Commands::Candidate { action } => {
            let path = config.roster_path();
            match action {
                CandidateAction::Add { name } => {
                    let c = roster::add_candidate(&path, &name)?;
                    println!("Candidate '{}' added successfully with ID {}.", c.name, c.id);
                }
                CandidateAction::List => {
                    let candidates = roster::load_roster(&path)?;
                    if json {
                        print_json(&candidates)?;
                    } else {
                        for c in &candidates {
                            println!("ID: {}, Name: {}", c.id, c.name);
                        }
                    }
                }
                CandidateAction::Clear => {
                    roster::clear_roster(&path)?;
                    println!("All candidates cleared.");
                }
            }
        }
        Commands::Deadline { action } => {
            let path = config.deadline_path();
            match action {
                DeadlineAction::Set { in_secs, at } => {
                    let deadline = match (in_secs, at) {
                        (Some(secs), _) => VotingDeadline::after(current_time(), secs),
                        (None, Some(at)) => VotingDeadline::parse_rfc3339(&at)?,
                        (None, None) => return Err("either --in or --at is required".into()),
                    };
                    deadline.save(&path)?;
                    println!("Voting closes at {deadline}");
                }
                DeadlineAction::Show => match VotingDeadline::load(&path)? {
                    None => println!("No voting deadline set; voting is open"),
                    Some(d) if d.has_passed(current_time()) => println!("Voting closed at {d}"),
                    Some(d) => println!("Voting open until {d}"),
                },
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err("refusing to destroy data without --yes".into());
            }
            Election::reset(&config)?;
            println!("Data destroyed. Both ledger and voter data have been cleared.");
        }
    }

    Ok(())
}
