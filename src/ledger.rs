//! Append-only event ledger.
//!
//! The interface shape is the guarantee: there is an `append` and a `list`,
//! and nothing else: no update, no delete. Sequence numbers are assigned by
//! the store, monotonic from 1 and gapless.

use thiserror::Error;

use crate::events::{Event, EventBody};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ledger encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("ledger corrupt: {0}")]
    Corrupt(String),
}

/// The single source of truth for a session.
pub trait LedgerStore {
    /// Append one event; returns the assigned sequence number.
    /// Fails only on fatal storage error; the caller must then treat the
    /// whole command as failed.
    fn append(&mut self, occurred_at_ms: u64, body: EventBody) -> Result<u64, LedgerError>;

    /// All events with `seq >= from_seq` (1 when absent), in sequence order.
    fn list(&self, from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError>;

    /// The last assigned sequence number (0 when empty).
    fn last_seq(&self) -> u64;
}

/// In-process backing: a plain ordered vector.
#[derive(Debug, Default)]
pub struct MemLedger {
    events: Vec<Event>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemLedger {
    fn append(&mut self, occurred_at_ms: u64, body: EventBody) -> Result<u64, LedgerError> {
        let seq = self.events.len() as u64 + 1;
        self.events.push(Event {
            seq,
            occurred_at_ms,
            body,
        });
        Ok(seq)
    }

    fn list(&self, from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError> {
        let from = from_seq.unwrap_or(1).max(1);
        Ok(self
            .events
            .iter()
            .filter(|e| e.seq >= from)
            .cloned()
            .collect())
    }

    fn last_seq(&self) -> u64 {
        self.events.len() as u64
    }
}
