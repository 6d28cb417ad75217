//! Session orchestration: owns the live state, serializes commands, appends
//! events, serves projections.
//!
//! Commit discipline: every mutating command computes its candidate state
//! first, then appends the event, and only assigns the new state once the
//! append succeeded. A failed append fails the whole command; success is
//! never reported for an event that was not recorded.

use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::events::{Event, EventBody, SelfcheckSubmission};
use crate::gauges::{self, Action, GaugeVector};
use crate::ledger::{LedgerError, LedgerStore};
use crate::logging::{self, obj, v_num, v_str, Domain, Level};
use crate::projection::{self, ViewModel};
use crate::replay::{self, state_digest, state_hash, ReplayedState};
use crate::route::{self, RouteFlags, RouteState};
use crate::selfcheck::SelfcheckCorrelator;

/// Command rejection taxonomy. All three are synchronous; none leaves a
/// partial state behind.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid command: {input:?}")]
    InvalidCommand { input: String },
    #[error("selfcheck expired: {elapsed_secs:.1}s elapsed of a {window_secs:.0}s window")]
    Expired {
        elapsed_secs: f64,
        window_secs: f64,
    },
    #[error("ledger write failure")]
    LedgerWrite(#[source] LedgerError),
}

/// Result of a committed APPLY_ACTION.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub action: Action,
    pub advanced: bool,
    pub current_waypoint_id: String,
    pub progress: f64,
    pub seq: u64,
    pub state_hash: u64,
}

/// Result of a committed SUBMIT_SELFCHECK.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SelfcheckOutcome {
    pub seq: u64,
    pub window_remaining_secs: f64,
}

/// Ledger-vs-live verification report.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub replayed: ReplayedState,
    pub digest: String,
    pub live_digest: String,
    /// Digest equality between the fold and the live state. Meaningful when
    /// the fold covered the full history (or a suffix starting at a reset
    /// breakpoint); `from_seq` records what was folded.
    pub matches_live: bool,
    pub from_seq: u64,
    pub config_hash: String,
}

pub struct SessionEngine<L: LedgerStore> {
    cfg: Config,
    ledger: L,
    gauges: GaugeVector,
    route: RouteState,
    flags: RouteFlags,
    correlator: SelfcheckCorrelator,
    updated_at_ms: u64,
}

impl<L: LedgerStore> SessionEngine<L> {
    pub fn new(cfg: Config, ledger: L, now_ms: u64) -> Self {
        Self {
            cfg,
            ledger,
            gauges: GaugeVector::initial(),
            route: RouteState::initial(),
            flags: RouteFlags::default(),
            correlator: SelfcheckCorrelator::new(now_ms),
            updated_at_ms: now_ms,
        }
    }

    /// Rebuild a session over a ledger that already holds events: fold the
    /// history into live state and re-open the selfcheck window from the
    /// most recent applied action.
    pub fn recover(cfg: Config, ledger: L, now_ms: u64) -> Result<Self, LedgerError> {
        let events = ledger.list(None)?;
        let replayed = replay::replay(&events, &cfg);
        let mut correlator = SelfcheckCorrelator::new(now_ms);
        for event in events.iter().rev() {
            match &event.body {
                EventBody::ActionApplied { .. } => {
                    correlator.open_window(event.occurred_at_ms);
                    break;
                }
                EventBody::StateReset {} => break,
                EventBody::SelfcheckSubmitted { .. } => continue,
            }
        }
        logging::log(
            Level::Info,
            Domain::Session,
            "recovered",
            obj(&[
                ("events", v_num(events.len() as f64)),
                ("state_hash", v_str(&format!("{:016x}", state_hash(&replayed.gauges, &replayed.route)))),
            ]),
        );
        Ok(Self {
            cfg,
            ledger,
            gauges: replayed.gauges,
            route: replayed.route,
            flags: RouteFlags::default(),
            correlator,
            updated_at_ms: now_ms,
        })
    }

    /// APPLY_ACTION with a wire string: out-of-domain input is rejected
    /// before any state is touched.
    pub fn apply_action_str(
        &mut self,
        input: &str,
        now_ms: u64,
    ) -> Result<ActionOutcome, CommandError> {
        let action = Action::parse(input).ok_or_else(|| CommandError::InvalidCommand {
            input: input.to_string(),
        })?;
        self.apply_action(action, now_ms)
    }

    /// APPLY_ACTION: gauge transition, route progression, event append,
    /// fresh selfcheck window, committed together or not at all.
    pub fn apply_action(
        &mut self,
        action: Action,
        now_ms: u64,
    ) -> Result<ActionOutcome, CommandError> {
        let next_gauges = gauges::apply_action(&self.gauges, action, &self.cfg);
        let advance = route::advance(&self.route, &next_gauges, &self.flags, &self.cfg);
        let next_route = advance.state;
        let hash = state_hash(&next_gauges, &next_route);

        let seq = self
            .ledger
            .append(
                now_ms,
                EventBody::ActionApplied {
                    action,
                    flags: self.flags,
                    gauges: next_gauges,
                    route_index: next_route.current_index,
                    route_progress: next_route.progress,
                    state_hash: hash,
                },
            )
            .map_err(CommandError::LedgerWrite)?;

        self.gauges = next_gauges;
        self.route = next_route;
        self.updated_at_ms = now_ms;
        self.correlator.open_window(now_ms);

        logging::log(
            Level::Info,
            Domain::Session,
            "action_applied",
            obj(&[
                ("action", v_str(action.as_str())),
                ("seq", v_num(seq as f64)),
                ("advanced", serde_json::Value::Bool(advance.advanced)),
                ("progress", v_num(self.route.progress)),
                ("state_hash", v_str(&format!("{hash:016x}"))),
            ]),
        );

        let current_waypoint_id = route::primary_route()[self.route.current_index].id.clone();
        Ok(ActionOutcome {
            action,
            advanced: advance.advanced,
            current_waypoint_id,
            progress: self.route.progress,
            seq,
            state_hash: hash,
        })
    }

    /// SUBMIT_SELFCHECK: window check, then log-only append. Never mutates
    /// the gauge vector.
    pub fn submit_selfcheck(
        &mut self,
        submission: SelfcheckSubmission,
        now_ms: u64,
    ) -> Result<SelfcheckOutcome, CommandError> {
        if !submission.in_bounds() {
            return Err(CommandError::InvalidCommand {
                input: "selfcheck scalars outside [0,1]".to_string(),
            });
        }
        let status = self
            .correlator
            .accept(now_ms, self.cfg.selfcheck_window_ms)
            .map_err(|expired| CommandError::Expired {
                elapsed_secs: expired.elapsed_secs,
                window_secs: expired.window_secs,
            })?;

        let seq = self
            .ledger
            .append(now_ms, EventBody::SelfcheckSubmitted { submission })
            .map_err(CommandError::LedgerWrite)?;

        logging::log(
            Level::Info,
            Domain::Selfcheck,
            "selfcheck_submitted",
            obj(&[
                ("seq", v_num(seq as f64)),
                ("remaining_secs", v_num(status.remaining_secs)),
            ]),
        );

        Ok(SelfcheckOutcome {
            seq,
            window_remaining_secs: status.remaining_secs,
        })
    }

    /// RESET: back to the starting constants, with its own ledger entry.
    pub fn reset(&mut self, now_ms: u64) -> Result<u64, CommandError> {
        let seq = self
            .ledger
            .append(now_ms, EventBody::StateReset {})
            .map_err(CommandError::LedgerWrite)?;

        self.gauges = GaugeVector::initial();
        self.route = RouteState::initial();
        self.updated_at_ms = now_ms;
        self.correlator.close_window();

        logging::log(
            Level::Info,
            Domain::Session,
            "state_reset",
            obj(&[("seq", v_num(seq as f64))]),
        );
        Ok(seq)
    }

    /// Externally supplied trigger inputs; takes effect from the next
    /// applied action.
    pub fn set_flags(&mut self, flags: RouteFlags) {
        self.flags = flags;
    }

    /// The read-only projection of current state.
    pub fn view(&self) -> ViewModel {
        projection::project(&self.gauges, &self.route, self.updated_at_ms)
    }

    pub fn events(&self, from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError> {
        self.ledger.list(from_seq)
    }

    /// Fold the ledger and compare against live state.
    pub fn replay_check(&self, from_seq: Option<u64>) -> Result<ReplayReport, LedgerError> {
        let from = from_seq.unwrap_or(1).max(1);
        let events = self.ledger.list(Some(from))?;
        let replayed = replay::replay(&events, &self.cfg);
        let digest = state_digest(&replayed.gauges, &replayed.route);
        let live_digest = state_digest(&self.gauges, &self.route);
        let matches_live = digest == live_digest;
        Ok(ReplayReport {
            replayed,
            digest,
            live_digest,
            matches_live,
            from_seq: from,
            config_hash: self.cfg.config_hash(),
        })
    }

    pub fn gauges(&self) -> &GaugeVector {
        &self.gauges
    }

    pub fn route(&self) -> &RouteState {
        &self.route
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn state_hash(&self) -> u64 {
        state_hash(&self.gauges, &self.route)
    }

    pub fn last_seq(&self) -> u64 {
        self.ledger.last_seq()
    }
}
