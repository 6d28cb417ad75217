//! Fold a recorded ledger and print the reconstructed state.
//!
//! Usage: replay <path> [from_seq]
//! `.sqlite` paths open as a SQLite ledger; anything else reads as a
//! JSON-lines journal. The fold runs twice to confirm idempotence.

use anyhow::{ensure, Context, Result};

use wayfield::config::Config;
use wayfield::events::Event;
use wayfield::journal::Journal;
use wayfield::ledger::LedgerStore;
use wayfield::replay::{replay, state_digest};
use wayfield::storage::SqliteLedger;

fn load_events(path: &str, from_seq: Option<u64>) -> Result<Vec<Event>> {
    if path.ends_with(".sqlite") {
        let ledger = SqliteLedger::open(path).with_context(|| format!("open {path}"))?;
        Ok(ledger.list(from_seq)?)
    } else {
        let from = from_seq.unwrap_or(1);
        Ok(Journal::load(path)
            .with_context(|| format!("load {path}"))?
            .into_iter()
            .filter(|e| e.seq >= from)
            .collect())
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "session.journal".to_string());
    let from_seq: Option<u64> = args.next().and_then(|v| v.parse().ok());

    let cfg = Config::from_env();
    let events = load_events(&path, from_seq)?;
    if events.is_empty() {
        eprintln!("no events in {path}");
        return Ok(());
    }

    let first = replay(&events, &cfg);
    let second = replay(&events, &cfg);
    let digest = state_digest(&first.gauges, &first.route);
    ensure!(
        digest == state_digest(&second.gauges, &second.route),
        "fold is not idempotent"
    );

    println!("{}", serde_json::to_string_pretty(&first)?);
    println!(
        "events={} last_seq={} digest={} config_hash={}",
        first.folded_events,
        first.last_seq,
        digest,
        cfg.config_hash()
    );
    Ok(())
}
