use std::path::{Path, PathBuf};
use std::{fs, io};

use ballot_common::{BallotError, Result};
use serde::{Deserialize, Serialize};

/// File locations and limits for one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallotConfig {
    pub data_dir: PathBuf,
    pub registry_file: String,
    pub ledger_file: String,
    pub roster_file: String,
    pub deadline_file: String,
    /// Maximum number of blocks the ledger accepts.
    pub ledger_capacity: usize,
}

impl Default for BallotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            registry_file: "voter_data.bin".to_string(),
            ledger_file: "blockchain_data.bin".to_string(),
            roster_file: "candidates.txt".to_string(),
            deadline_file: "voting_time.txt".to_string(),
            ledger_capacity: ballot_ledger::DEFAULT_CAPACITY,
        }
    }
}

impl BallotConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.registry_file)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join(&self.roster_file)
    }

    pub fn deadline_path(&self) -> PathBuf {
        self.data_dir.join(&self.deadline_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn validate(&self) -> Result<()> {
        if self.ledger_capacity == 0 {
            return Err(BallotError::Config("ledger_capacity must be at least 1".into()));
        }
        for (field, value) in [
            ("registry_file", &self.registry_file),
            ("ledger_file", &self.ledger_file),
            ("roster_file", &self.roster_file),
            ("deadline_file", &self.deadline_file),
        ] {
            if value.trim().is_empty() {
                return Err(BallotError::Config(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(path, json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<BallotConfig>(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(parsed)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = match Self::load_from_file(path.as_ref()) {
            Ok(config) => config,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(BallotError::Config(format!(
                    "{}: {}",
                    path.as_ref().display(),
                    e
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }
}
