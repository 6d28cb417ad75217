//! Ledger backing validation: the SQLite and journal stores must behave
//! identically to the in-memory ledger under append, listing, reopen and
//! replay.

use tempfile::tempdir;

use wayfield::config::Config;
use wayfield::gauges::Action;
use wayfield::journal::Journal;
use wayfield::ledger::{LedgerStore, MemLedger};
use wayfield::replay::{replay, state_digest};
use wayfield::session::SessionEngine;
use wayfield::storage::SqliteLedger;

const SCRIPT: &[Action] = &[
    Action::Push,
    Action::Push,
    Action::Hold,
    Action::Drift,
    Action::Push,
    Action::Push,
    Action::Hold,
];

fn drive<L: LedgerStore>(engine: &mut SessionEngine<L>) {
    for (i, action) in SCRIPT.iter().enumerate() {
        engine.apply_action(*action, (i as u64 + 1) * 1_000).unwrap();
    }
}

// ---------------------------------------------------------------------------
// SQLite backing
// ---------------------------------------------------------------------------
#[test]
fn sqlite_ledger_survives_reopen_and_replays_to_live_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.sqlite");
    let path = path.to_str().unwrap();

    let cfg = Config::from_env();
    let live_digest;
    {
        let ledger = SqliteLedger::open(path).unwrap();
        let mut engine = SessionEngine::new(cfg.clone(), ledger, 0);
        drive(&mut engine);
        live_digest = state_digest(engine.gauges(), engine.route());
        let report = engine.replay_check(None).unwrap();
        assert!(report.matches_live);
    }

    // Reopen the file cold and fold it.
    let reopened = SqliteLedger::open(path).unwrap();
    assert_eq!(reopened.last_seq(), SCRIPT.len() as u64);
    let events = reopened.list(None).unwrap();
    assert_eq!(events.len(), SCRIPT.len());
    let folded = replay(&events, &cfg);
    assert_eq!(state_digest(&folded.gauges, &folded.route), live_digest);
}

#[test]
fn sqlite_sequence_continues_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.sqlite");
    let path = path.to_str().unwrap();

    {
        let mut ledger = SqliteLedger::open(path).unwrap();
        ledger
            .append(1_000, wayfield::events::EventBody::StateReset {})
            .unwrap();
    }
    {
        let mut ledger = SqliteLedger::open(path).unwrap();
        let seq = ledger
            .append(2_000, wayfield::events::EventBody::StateReset {})
            .unwrap();
        assert_eq!(seq, 2, "sequence must continue, not restart");
    }
}

// ---------------------------------------------------------------------------
// Journal backing
// ---------------------------------------------------------------------------
#[test]
fn journal_ledger_replays_to_live_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.journal");
    let path = path.to_str().unwrap();

    let cfg = Config::from_env();
    let journal = Journal::open(path).unwrap();
    let mut engine = SessionEngine::new(cfg.clone(), journal, 0);
    drive(&mut engine);
    let live_digest = state_digest(engine.gauges(), engine.route());

    let events = Journal::load(path).unwrap();
    assert_eq!(events.len(), SCRIPT.len());
    let folded = replay(&events, &cfg);
    assert_eq!(state_digest(&folded.gauges, &folded.route), live_digest);
}

// ---------------------------------------------------------------------------
// Backing equivalence
// ---------------------------------------------------------------------------
#[test]
fn all_backings_agree_on_the_same_script() {
    let dir = tempdir().unwrap();
    let cfg = Config::from_env();

    let mut mem_engine = SessionEngine::new(cfg.clone(), MemLedger::new(), 0);
    drive(&mut mem_engine);
    let mem_digest = state_digest(mem_engine.gauges(), mem_engine.route());

    let sqlite_path = dir.path().join("equiv.sqlite");
    let mut sqlite_engine = SessionEngine::new(
        cfg.clone(),
        SqliteLedger::open(sqlite_path.to_str().unwrap()).unwrap(),
        0,
    );
    drive(&mut sqlite_engine);
    assert_eq!(
        state_digest(sqlite_engine.gauges(), sqlite_engine.route()),
        mem_digest
    );

    let journal_path = dir.path().join("equiv.journal");
    let mut journal_engine = SessionEngine::new(
        cfg,
        Journal::open(journal_path.to_str().unwrap()).unwrap(),
        0,
    );
    drive(&mut journal_engine);
    assert_eq!(
        state_digest(journal_engine.gauges(), journal_engine.route()),
        mem_digest
    );

    // The serialized event streams agree too, not just the end state.
    let mem_events = mem_engine.events(None).unwrap();
    let sqlite_events = sqlite_engine.events(None).unwrap();
    let journal_events = journal_engine.events(None).unwrap();
    assert_eq!(mem_events, sqlite_events);
    assert_eq!(mem_events, journal_events);
}

// ---------------------------------------------------------------------------
// Session recovery over a durable ledger
// ---------------------------------------------------------------------------
#[test]
fn recover_resumes_a_sqlite_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resume.sqlite");
    let path = path.to_str().unwrap();

    let cfg = Config::from_env();
    let live_digest;
    {
        let mut engine = SessionEngine::new(cfg.clone(), SqliteLedger::open(path).unwrap(), 0);
        drive(&mut engine);
        live_digest = state_digest(engine.gauges(), engine.route());
    }

    let mut resumed =
        SessionEngine::recover(cfg, SqliteLedger::open(path).unwrap(), 60_000).unwrap();
    assert_eq!(state_digest(resumed.gauges(), resumed.route()), live_digest);

    // The resumed session keeps appending where the old one stopped.
    let outcome = resumed.apply_action(Action::Hold, 61_000).unwrap();
    assert_eq!(outcome.seq, SCRIPT.len() as u64 + 1);
}
