//! JSON-lines ledger backing: one serialized event per line, flushed on
//! every append. Doubles as the session's audit trail; the file is readable
//! with any line-oriented tooling.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::events::{Event, EventBody};
use crate::ledger::{LedgerError, LedgerStore};

#[derive(Debug)]
pub struct Journal {
    file: File,
    path: String,
    next_seq: u64,
}

impl Journal {
    /// Open (or create) a journal. The next sequence number continues from
    /// whatever the file already holds.
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let existing = Self::load(path)?;
        let last = existing.last().map(|e| e.seq).unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_string(),
            next_seq: last + 1,
        })
    }

    /// Read every event in the file, in order. Missing file reads as empty.
    pub fn load(path: &str) -> Result<Vec<Event>, LedgerError> {
        if !Path::new(path).exists() {
            return Ok(vec![]);
        }
        let reader = BufReader::new(File::open(path)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: Event = serde_json::from_str(&line)
                .map_err(|err| LedgerError::Corrupt(format!("bad journal line: {err}")))?;
            events.push(event);
        }
        Ok(events)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl LedgerStore for Journal {
    fn append(&mut self, occurred_at_ms: u64, body: EventBody) -> Result<u64, LedgerError> {
        let event = Event {
            seq: self.next_seq,
            occurred_at_ms,
            body,
        };
        let line = serde_json::to_string(&event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        self.next_seq += 1;
        Ok(event.seq)
    }

    fn list(&self, from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError> {
        let from = from_seq.unwrap_or(1).max(1);
        Ok(Self::load(&self.path)?
            .into_iter()
            .filter(|e| e.seq >= from)
            .collect())
    }

    fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }
}
