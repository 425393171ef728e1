//! Sequential ledger file.
//!
//! No header; each record is
//!
//! ```text
//! voter_len: u32 LE | voter bytes | cand_len: u32 LE | cand bytes | chain_hash: [u8; 32]
//! ```
//!
//! and end of file terminates the chain. The Merkle root is not stored.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use ballot_common::crypto::hash::DIGEST_LEN;
use ballot_common::ident::{validate_id, IdKind};
use ballot_common::utils::fs::read_or_empty;
use ballot_common::Digest;
use tracing::{debug, error};

use crate::block::VoteBlock;
use crate::errors::{LedgerError, Result};

#[derive(Debug)]
pub struct Binlog {
    path: PathBuf,
}

impl Binlog {
    /// Binds to `path`, creating its parent directory if needed. The file
    /// itself is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and syncs it.
    ///
    /// On a failed write the file is cut back to its previous length so no
    /// partial record survives.
    pub fn append(&mut self, block: &VoteBlock) -> Result<()> {
        let data = encode_record(block);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let offset = file.metadata()?.len();

        if let Err(e) = write_synced(&mut file, &data) {
            error!("Failed to append vote record to {:?}: {}", self.path, e);
            if let Err(trunc) = file.set_len(offset) {
                error!("Could not roll back partial record: {}", trunc);
            }
            return Err(e.into());
        }

        debug!("Appended {} bytes at offset {} of {:?}", data.len(), offset, self.path);
        Ok(())
    }

    /// Reads every record; a missing file holds none.
    pub fn read_all(&self) -> Result<Vec<VoteBlock>> {
        let bytes = read_or_empty(&self.path)?;
        decode_records(&bytes)
    }
}

fn write_synced(file: &mut File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data)?;
    file.sync_data()
}

/// Encodes one block into its on-disk record.
pub fn encode_record(block: &VoteBlock) -> Vec<u8> {
    let voter = block.voter_id().as_bytes();
    let cand = block.candidate_id().as_bytes();

    let mut out = Vec::with_capacity(8 + voter.len() + cand.len() + DIGEST_LEN);
    out.extend_from_slice(&(voter.len() as u32).to_le_bytes());
    out.extend_from_slice(voter);
    out.extend_from_slice(&(cand.len() as u32).to_le_bytes());
    out.extend_from_slice(cand);
    out.extend_from_slice(block.chain_hash().as_bytes());
    out
}

/// Decodes a whole ledger file.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<VoteBlock>> {
    let mut reader = RecordReader { bytes, pos: 0 };
    let mut blocks = Vec::new();
    while !reader.at_end() {
        let index = blocks.len();
        let voter_id = reader.read_id(index, IdKind::Voter)?;
        let candidate_id = reader.read_id(index, IdKind::Candidate)?;
        let chain_hash = reader.read_digest(index)?;
        blocks.push(VoteBlock::new(&voter_id, &candidate_id, chain_hash));
    }
    Ok(blocks)
}

struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, index: usize, n: usize, what: &str) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(LedgerError::CorruptLog(format!(
                "record {index}: truncated {what} at byte {}",
                self.pos
            ))),
        }
    }

    fn read_id(&mut self, index: usize, kind: IdKind) -> Result<String> {
        let len_bytes = self.take(index, 4, "length prefix")?;
        let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
        let raw = self.take(index, len, "identifier")?;
        let id = std::str::from_utf8(raw)
            .map_err(|e| LedgerError::CorruptLog(format!("record {index}: {kind} is not UTF-8: {e}")))?;
        validate_id(kind, id).map_err(|e| LedgerError::CorruptLog(format!("record {index}: {e}")))?;
        Ok(id.to_string())
    }

    fn read_digest(&mut self, index: usize) -> Result<Digest> {
        let raw = self.take(index, DIGEST_LEN, "chain hash")?;
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(raw);
        Ok(Digest::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::VoteChain;
    use tempfile::tempdir;

    fn sample_blocks() -> Vec<VoteBlock> {
        let mut chain = VoteChain::new(8);
        chain.append("V1", "C1").unwrap();
        chain.append("V2", "C2").unwrap();
        chain.append("V3", "C1").unwrap();
        chain.blocks().to_vec()
    }

    #[test]
    fn test_record_layout() {
        let blocks = sample_blocks();
        let rec = encode_record(&blocks[0]);
        assert_eq!(rec.len(), 4 + 2 + 4 + 2 + 32);
        assert_eq!(&rec[..4], &2u32.to_le_bytes());
        assert_eq!(&rec[4..6], b"V1");
        assert_eq!(&rec[6..10], &2u32.to_le_bytes());
        assert_eq!(&rec[10..12], b"C1");
        assert_eq!(&rec[12..], blocks[0].chain_hash().as_bytes());
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempdir().unwrap();
        let mut log = Binlog::new(dir.path().join("data/blockchain_data.bin")).unwrap();
        assert!(log.read_all().unwrap().is_empty());

        let blocks = sample_blocks();
        for b in &blocks {
            log.append(b).unwrap();
        }
        assert_eq!(log.read_all().unwrap(), blocks);
    }

    #[test]
    fn test_truncated_tail_is_corrupt() {
        let mut bytes: Vec<u8> = sample_blocks().iter().flat_map(encode_record).collect();
        bytes.truncate(bytes.len() - 5);
        let err = decode_records(&bytes).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptLog(ref m) if m.contains("record 2")));
    }

    #[test]
    fn test_oversized_length_prefix_is_corrupt() {
        let mut bytes = encode_record(&sample_blocks()[0]);
        bytes[..4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(decode_records(&bytes), Err(LedgerError::CorruptLog(_))));
    }

    #[test]
    fn test_empty_identifier_is_corrupt() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(b"C1");
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(matches!(decode_records(&bytes), Err(LedgerError::CorruptLog(_))));
    }
}
