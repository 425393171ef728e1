//! On-disk registry snapshot.
//!
//! Layout:
//!
//! ```text
//! "BREG" | version: u8 | count: u32 LE | count * record
//! record = id_len: u8 | id: [u8; 32] zero padded | voted: u8
//! ```
//!
//! Records are written in pre-order, but loading rebuilds the tree by
//! inserting every record through the balancing path, so the shape of the
//! loaded tree never depends on the record order in the file.

use ballot_common::ident::MAX_ID_LEN;

use crate::avl::{InsertOutcome, MarkOutcome, Registry};
use crate::errors::{RegistryError, Result};

pub const MAGIC: &[u8; 4] = b"BREG";
pub const VERSION: u8 = 1;
pub const HEADER_LEN: usize = MAGIC.len() + 1 + 4;
pub const RECORD_LEN: usize = 1 + MAX_ID_LEN + 1;

/// A decoded record, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub voter_id: String,
    pub has_voted: bool,
}

fn corrupt(msg: impl Into<String>) -> RegistryError {
    RegistryError::CorruptSnapshot(msg.into())
}

/// Serializes `registry` into the snapshot layout.
pub fn encode(registry: &Registry) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + registry.len() * RECORD_LEN);
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(registry.len() as u32).to_le_bytes());

    for node in registry.preorder() {
        let id = node.voter_id().as_bytes();
        let mut field = [0u8; MAX_ID_LEN];
        field[..id.len()].copy_from_slice(id);

        out.push(id.len() as u8);
        out.extend_from_slice(&field);
        out.push(u8::from(node.has_voted()));
    }
    out
}

/// Reads the raw records of a snapshot without building a tree.
///
/// A zero-length input holds no records.
pub fn read_records(bytes: &[u8]) -> Result<Vec<SnapshotRecord>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    if bytes.len() < HEADER_LEN {
        return Err(corrupt(format!("header truncated at {} bytes", bytes.len())));
    }

    let (header, body) = bytes.split_at(HEADER_LEN);
    if &header[..4] != MAGIC {
        return Err(corrupt("bad magic"));
    }
    if header[4] != VERSION {
        return Err(corrupt(format!("unsupported version {}", header[4])));
    }
    let count = u32::from_le_bytes([header[5], header[6], header[7], header[8]]) as usize;

    let expected = count
        .checked_mul(RECORD_LEN)
        .ok_or_else(|| corrupt(format!("record count {count} overflows")))?;
    if body.len() != expected {
        return Err(corrupt(format!(
            "header declares {count} records ({expected} bytes) but body holds {} bytes",
            body.len()
        )));
    }

    body.chunks_exact(RECORD_LEN)
        .enumerate()
        .map(|(i, rec)| decode_record(i, rec))
        .collect()
}

fn decode_record(index: usize, rec: &[u8]) -> Result<SnapshotRecord> {
    let id_len = rec[0] as usize;
    if id_len == 0 || id_len > MAX_ID_LEN {
        return Err(corrupt(format!("record {index}: id length {id_len}")));
    }
    let field = &rec[1..1 + MAX_ID_LEN];
    if field[id_len..].iter().any(|b| *b != 0) {
        return Err(corrupt(format!("record {index}: non-zero padding")));
    }
    let voter_id = std::str::from_utf8(&field[..id_len])
        .map_err(|e| corrupt(format!("record {index}: {e}")))?
        .to_string();
    let has_voted = match rec[RECORD_LEN - 1] {
        0 => false,
        1 => true,
        other => return Err(corrupt(format!("record {index}: voted flag {other}"))),
    };
    Ok(SnapshotRecord { voter_id, has_voted })
}

/// Rebuilds a registry from snapshot bytes.
pub fn decode(bytes: &[u8]) -> Result<Registry> {
    let mut registry = Registry::new();
    for (i, rec) in read_records(bytes)?.into_iter().enumerate() {
        match registry.insert(&rec.voter_id) {
            Ok(InsertOutcome::Inserted) => {}
            Ok(InsertOutcome::AlreadyPresent) => {
                return Err(corrupt(format!("record {i}: duplicate id `{}`", rec.voter_id)));
            }
            Err(e) => return Err(corrupt(format!("record {i}: {e}"))),
        }
        if rec.has_voted && registry.mark_voted(&rec.voter_id) != MarkOutcome::MarkedNow {
            return Err(corrupt(format!("record {i}: could not restore voted flag")));
        }
    }
    Ok(registry)
}
