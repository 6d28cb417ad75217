//! SQLite ledger backing: the session-scoped durable record.
//!
//! One append-only `events` table. Sequence numbers are managed here, not by
//! the database, so they stay gapless even across reopen.

use rusqlite::{params, Connection};

use crate::events::{Event, EventBody};
use crate::ledger::{LedgerError, LedgerStore};

pub struct SqliteLedger {
    conn: Connection,
    next_seq: u64,
}

impl SqliteLedger {
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY,
                occurred_at_ms INTEGER NOT NULL,
                event_kind TEXT NOT NULL,
                payload TEXT NOT NULL
            );
            COMMIT;",
        )?;
        let last: u64 = conn.query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| {
            row.get::<_, i64>(0)
        })? as u64;
        Ok(Self {
            conn,
            next_seq: last + 1,
        })
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY,
                occurred_at_ms INTEGER NOT NULL,
                event_kind TEXT NOT NULL,
                payload TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn, next_seq: 1 })
    }
}

impl LedgerStore for SqliteLedger {
    fn append(&mut self, occurred_at_ms: u64, body: EventBody) -> Result<u64, LedgerError> {
        let seq = self.next_seq;
        let payload = serde_json::to_string(&body)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO events (seq, occurred_at_ms, event_kind, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![seq as i64, occurred_at_ms as i64, body.kind(), payload],
        )?;
        tx.commit()?;
        self.next_seq += 1;
        Ok(seq)
    }

    fn list(&self, from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError> {
        let from = from_seq.unwrap_or(1).max(1);
        let mut stmt = self.conn.prepare(
            "SELECT seq, occurred_at_ms, payload FROM events WHERE seq >= ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![from as i64], |row| {
            let seq: i64 = row.get(0)?;
            let occurred_at_ms: i64 = row.get(1)?;
            let payload: String = row.get(2)?;
            Ok((seq as u64, occurred_at_ms as u64, payload))
        })?;
        let mut events = Vec::new();
        for row in rows {
            let (seq, occurred_at_ms, payload) = row?;
            let body: EventBody = serde_json::from_str(&payload)
                .map_err(|err| LedgerError::Corrupt(format!("bad payload at seq {seq}: {err}")))?;
            events.push(Event {
                seq,
                occurred_at_ms,
                body,
            });
        }
        Ok(events)
    }

    fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }
}
