//! Demo service loop: drives a live session through a scripted action cycle
//! with timed selfchecks, printing the projection after every commit.
//!
//! Knobs: ITERS (steps, default 24), STEP_MS (pace, default 1000),
//! SQLITE_PATH (ledger location).

use anyhow::Result;
use tokio::time::{sleep, Duration};

use wayfield::config::{now_ms, Config};
use wayfield::events::SelfcheckSubmission;
use wayfield::gauges::Action;
use wayfield::ledger::LedgerStore;
use wayfield::logging::{self, obj, v_num, v_str, Domain, Level};
use wayfield::session::SessionEngine;
use wayfield::storage::SqliteLedger;

fn script(step: u64) -> Action {
    // Push toward the next waypoint, then settle and recover.
    match step % 6 {
        0 | 1 | 2 => Action::Push,
        3 => Action::Hold,
        4 => Action::Drift,
        _ => Action::Hold,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let iters: u64 = std::env::var("ITERS").ok().and_then(|v| v.parse().ok()).unwrap_or(24);
    let step_ms: u64 = std::env::var("STEP_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(1000);

    logging::log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("config_hash", v_str(&cfg.config_hash())),
            ("iters", v_num(iters as f64)),
        ]),
    );

    let ledger = SqliteLedger::open(&cfg.sqlite_path)?;
    let mut engine = if ledger.last_seq() > 0 {
        SessionEngine::recover(cfg, ledger, now_ms())?
    } else {
        SessionEngine::new(cfg, ledger, now_ms())
    };

    for step in 0..iters {
        let action = script(step);
        let outcome = engine.apply_action(action, now_ms())?;

        if outcome.advanced {
            logging::log(
                Level::Info,
                Domain::Route,
                "waypoint_reached",
                obj(&[
                    ("waypoint", v_str(&outcome.current_waypoint_id)),
                    ("seq", v_num(outcome.seq as f64)),
                ]),
            );
        }

        // Attach a selfcheck right after every sixth action, while the
        // window is certainly open.
        if step % 6 == 5 {
            let submitted = engine.submit_selfcheck(
                SelfcheckSubmission {
                    alignment: 0.7,
                    clarity: 0.6,
                    friction: 0.3,
                    momentum: 0.5,
                    confidence: 0.8,
                    recovery: 0.6,
                    client_ts_ms: now_ms(),
                },
                now_ms(),
            )?;
            logging::log(
                Level::Debug,
                Domain::Selfcheck,
                "attached",
                obj(&[("remaining_secs", v_num(submitted.window_remaining_secs))]),
            );
        }

        println!("{}", serde_json::to_string(&engine.view())?);
        sleep(Duration::from_millis(step_ms)).await;
    }

    let report = engine.replay_check(None)?;
    logging::log(
        Level::Info,
        Domain::Replay,
        "shutdown_check",
        obj(&[
            ("folded_events", v_num(report.replayed.folded_events as f64)),
            ("matches_live", serde_json::Value::Bool(report.matches_live)),
            ("digest", v_str(&report.digest)),
        ]),
    );
    anyhow::ensure!(report.matches_live, "ledger fold diverged from live state");
    Ok(())
}
