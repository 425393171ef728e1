//! Candidate roster file: one `id,name` pair per line.
//!
//! The tally only reads it; adding and clearing entries belongs to the
//! election administrator.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use ballot_common::ident::{validate_id, IdKind};
use ballot_common::utils::fs::truncate;
use ballot_common::{BallotError, Candidate, Result};
use rand::Rng;
use tracing::{info, warn};

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Parses roster text, skipping blank and malformed lines.
pub fn parse_roster(text: &str) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let Some((id, name)) = line.split_once(',') else {
            warn!("Skipping roster line {}: missing comma", lineno + 1);
            continue;
        };
        let (id, name) = (id.trim(), name.trim());
        if name.is_empty() {
            warn!("Skipping roster line {}: missing name", lineno + 1);
            continue;
        }
        if let Err(e) = validate_id(IdKind::Candidate, id) {
            warn!("Skipping roster line {}: {}", lineno + 1, e);
            continue;
        }
        out.push(Candidate::new(id, name));
    }
    out
}

/// Loads the roster at `path`; a missing file is an empty roster.
pub fn load_roster(path: &Path) -> Result<Vec<Candidate>> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let roster = parse_roster(&text);
            info!("Loaded {} candidates from {:?}", roster.len(), path);
            Ok(roster)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Roster file {:?} not found", path);
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Random `XXXXX-XXXXX` identifier over `[A-Z0-9]`.
pub fn generate_candidate_id<R: Rng>(rng: &mut R) -> String {
    let mut pick = |n: usize| -> String {
        (0..n)
            .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
            .collect()
    };
    let head = pick(5);
    let tail = pick(5);
    format!("{head}-{tail}")
}

/// Appends a candidate with a freshly generated id.
pub fn add_candidate(path: &Path, name: &str) -> Result<Candidate> {
    let name = name.trim();
    if name.is_empty() || name.contains(['\n', '\r']) {
        return Err(BallotError::Other(format!(
            "candidate name {name:?} must be a single non-empty line"
        )));
    }

    let taken: HashSet<String> = load_roster(path)?.into_iter().map(|c| c.id).collect();
    let mut rng = rand::thread_rng();
    let id = loop {
        let id = generate_candidate_id(&mut rng);
        if !taken.contains(&id) {
            break id;
        }
    };

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{id},{name}")?;

    info!("Candidate {} added with id {}", name, id);
    Ok(Candidate::new(id, name))
}

pub fn clear_roster(path: &Path) -> Result<()> {
    truncate(path)?;
    info!("Roster {:?} cleared", path);
    Ok(())
}
