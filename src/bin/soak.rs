//! Seeded random command soak: long runs of mixed valid and out-of-domain
//! commands, with gauge bounds and replay equality asserted at checkpoints.
//!
//! Knobs: SEED (default 42), EVENTS (default 2000). Same seed, same run.

use wayfield::config::Config;
use wayfield::events::SelfcheckSubmission;
use wayfield::ledger::MemLedger;
use wayfield::session::{CommandError, SessionEngine};

fn lcg(seed: &mut u64) -> u64 {
    *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    *seed
}

fn pick(seed: &mut u64, n: u64) -> u64 {
    lcg(seed) % n
}

fn unit(seed: &mut u64) -> f64 {
    pick(seed, 10_000) as f64 / 10_000.0
}

fn main() {
    let mut seed = std::env::var("SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(42u64);
    let events = std::env::var("EVENTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2000u64);

    let cfg = Config::from_env();
    let mut engine = SessionEngine::new(cfg, MemLedger::new(), 0);
    let mut now_ms = 0u64;

    let mut applied = 0u64;
    let mut rejected_invalid = 0u64;
    let mut selfchecks_ok = 0u64;
    let mut selfchecks_expired = 0u64;
    let mut resets = 0u64;

    for step in 0..events {
        now_ms += pick(&mut seed, 90_000); // 0..90s between commands
        let roll = pick(&mut seed, 100);

        if roll < 55 {
            let action = ["HOLD", "PUSH", "DRIFT"][pick(&mut seed, 3) as usize];
            engine.apply_action_str(action, now_ms).expect("legal action");
            applied += 1;
        } else if roll < 65 {
            match engine.apply_action_str("SPRINT", now_ms) {
                Err(CommandError::InvalidCommand { .. }) => rejected_invalid += 1,
                other => panic!("out-of-domain action must be rejected, got {other:?}"),
            }
        } else if roll < 90 {
            let submission = SelfcheckSubmission {
                alignment: unit(&mut seed),
                clarity: unit(&mut seed),
                friction: unit(&mut seed),
                momentum: unit(&mut seed),
                confidence: unit(&mut seed),
                recovery: unit(&mut seed),
                client_ts_ms: now_ms,
            };
            match engine.submit_selfcheck(submission, now_ms) {
                Ok(_) => selfchecks_ok += 1,
                Err(CommandError::Expired { .. }) => selfchecks_expired += 1,
                Err(other) => panic!("unexpected selfcheck rejection: {other:?}"),
            }
        } else {
            engine.reset(now_ms).expect("reset");
            resets += 1;
        }

        let gauges = engine.gauges();
        assert!(gauges.in_bounds(), "gauges out of bounds at step {step}: {gauges:?}");

        if step % 250 == 249 {
            let report = engine.replay_check(None).expect("replay check");
            assert!(
                report.matches_live,
                "replay diverged at step {step}: {} != {}",
                report.digest, report.live_digest
            );
        }
    }

    let report = engine.replay_check(None).expect("final replay check");
    assert!(report.matches_live, "final replay diverged");

    println!(
        "soak ok: events={events} applied={applied} invalid_rejected={rejected_invalid} \
         selfchecks_ok={selfchecks_ok} selfchecks_expired={selfchecks_expired} resets={resets} \
         ledger_len={} digest={}",
        engine.last_seq(),
        report.digest
    );
}
