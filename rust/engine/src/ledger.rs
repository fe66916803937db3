//! Append-only JSONL ledger with SHA-256 hash chaining.
//!
//! One JSON object per line, fields in the order
//! `{seq, type, payload, ts, prev_hash, hash}`. Every record's hash covers
//! the previous record's hash plus a canonical encoding of the new record's
//! non-hash fields, so any alteration of history is detectable on a full
//! read. Appends are flushed and fsynced before the in-memory tail advances:
//! state derived from an event that failed to reach disk never exists.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::errors::LedgerError;
use crate::events::Event;

/// One persisted ledger record. `kind` stays a free string so that a ledger
/// written by a newer version still verifies here; unknown types are only
/// rejected at replay time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
    pub ts: String,
    pub prev_hash: String,
    pub hash: String,
}

/// Rebuild a JSON value with recursively sorted object keys. Hash inputs must
/// not depend on field declaration or insertion order.
fn canonicalize(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());
            let mut out = Map::new();
            for (k, val) in entries {
                out.insert(k.clone(), canonicalize(val));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Strip the line terminator from one raw segment. Parsing works on bytes:
/// a torn write can end in the middle of a multi-byte card code, so the file
/// is never assumed to be valid UTF-8 as a whole.
fn strip_line(seg: &[u8]) -> &[u8] {
    let seg = seg.strip_suffix(b"\n").unwrap_or(seg);
    seg.strip_suffix(b"\r").unwrap_or(seg)
}

fn hash_record(prev_hash: &str, seq: u64, kind: &str, payload: &Value, ts: &str) -> String {
    let mut core = Map::new();
    core.insert("payload".to_string(), canonicalize(payload));
    core.insert("seq".to_string(), Value::from(seq));
    core.insert("ts".to_string(), Value::from(ts));
    core.insert("type".to_string(), Value::from(kind));
    let encoded = Value::Object(core).to_string();

    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(encoded.as_bytes());
    hex::encode(hasher.finalize())
}

/// Durable, single-writer event log for one game session.
pub struct Ledger {
    path: PathBuf,
    writer: BufWriter<File>,
    seq: u64,
    last_hash: String,
}

impl Ledger {
    /// Open (or create) a ledger file and recover the tail state with one
    /// lenient scan, so appends can continue immediately. A torn trailing
    /// write (an unparsable final fragment, the only kind of damage a crashed
    /// single writer can leave) is truncated away; full chain verification is
    /// the job of [`Ledger::read_all`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let mut seq = 0u64;
        let mut last_hash = String::new();
        let mut needs_newline = false;
        if path.exists() {
            let data = std::fs::read(&path)?;
            let segments: Vec<&[u8]> = data.split_inclusive(|&b| b == b'\n').collect();
            let mut offset = 0u64;
            let mut end = data.len();
            for (i, seg) in segments.iter().enumerate() {
                match serde_json::from_slice::<LedgerRecord>(strip_line(seg)) {
                    Ok(rec) => {
                        seq = rec.seq;
                        last_hash = rec.hash;
                    }
                    Err(_) if i + 1 == segments.len() => {
                        let f = OpenOptions::new().write(true).open(&path)?;
                        f.set_len(offset)?;
                        f.sync_data()?;
                        end = offset as usize;
                        break;
                    }
                    Err(_) => {}
                }
                offset += seg.len() as u64;
            }
            needs_newline = end > 0 && data[end - 1] != b'\n';
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        if needs_newline {
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        Ok(Self {
            path,
            writer,
            seq,
            last_hash,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_seq(&self) -> u64 {
        self.seq
    }

    /// Append one event: assign the next sequence number, stamp the UTC time,
    /// chain the hash and write the full record as a single line. The record
    /// is on disk before this returns.
    pub fn append(&mut self, event: &Event) -> Result<LedgerRecord, LedgerError> {
        let seq = self.seq + 1;
        let kind = event.event_type().as_str();
        let payload = event.payload()?;
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let hash = hash_record(&self.last_hash, seq, kind, &payload, &ts);

        let record = LedgerRecord {
            seq,
            kind: kind.to_string(),
            payload,
            ts,
            prev_hash: self.last_hash.clone(),
            hash,
        };
        let line = serde_json::to_string(&record)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;

        self.seq = seq;
        self.last_hash = record.hash.clone();
        Ok(record)
    }

    /// Full linear scan recomputing the hash chain from the empty sentinel.
    ///
    /// The trailing line is allowed to be torn: if it fails to parse or to
    /// verify it is dropped rather than reported. Any earlier mismatch is a
    /// hard integrity failure naming the offending sequence number, and the
    /// sequence must be gapless starting at 1.
    pub fn read_all(&self) -> Result<Vec<LedgerRecord>, LedgerError> {
        Self::read_path(&self.path)
    }

    /// Verified read of an arbitrary ledger file (see [`Ledger::read_all`]).
    pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Vec<LedgerRecord>, LedgerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read(path)?;
        let lines: Vec<&[u8]> = data.split_inclusive(|&b| b == b'\n').collect();

        let mut out: Vec<LedgerRecord> = Vec::with_capacity(lines.len());
        let mut prev_hash = String::new();
        for (i, line) in lines.iter().enumerate() {
            let is_final = i + 1 == lines.len();
            let rec: LedgerRecord = match serde_json::from_slice(strip_line(line)) {
                Ok(rec) => rec,
                Err(_) if is_final => break,
                Err(_) => return Err(LedgerError::Malformed { line: i + 1 }),
            };
            let expected = hash_record(&prev_hash, rec.seq, &rec.kind, &rec.payload, &rec.ts);
            if expected != rec.hash {
                if is_final {
                    break;
                }
                return Err(LedgerError::Corrupted { seq: rec.seq });
            }
            let expected_seq = out.last().map(|r: &LedgerRecord| r.seq + 1).unwrap_or(1);
            if rec.seq != expected_seq {
                return Err(LedgerError::SequenceGap {
                    expected: expected_seq,
                    found: rec.seq,
                });
            }
            prev_hash = rec.hash.clone();
            out.push(rec);
        }
        Ok(out)
    }
}
