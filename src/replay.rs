//! Deterministic state reconstruction: fold the ledger from the fixed
//! initial constants.
//!
//! ACTION_APPLIED entries re-run the gauge and route transitions (with the
//! flags recorded on the event). SELFCHECK_SUBMITTED entries have no state
//! effect. STATE_RESET entries are fold breakpoints: state reinitializes
//! rather than combining with prior history.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::events::{Event, EventBody};
use crate::gauges::{self, GaugeVector};
use crate::route::{self, RouteState};

/// State reconstructed from a ledger fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayedState {
    pub gauges: GaugeVector,
    pub route: RouteState,
    pub folded_events: usize,
    pub last_seq: u64,
}

impl ReplayedState {
    pub fn initial() -> Self {
        Self {
            gauges: GaugeVector::initial(),
            route: RouteState::initial(),
            folded_events: 0,
            last_seq: 0,
        }
    }
}

/// Fold a list of events, in order, from the initial constants.
pub fn replay(events: &[Event], cfg: &Config) -> ReplayedState {
    let mut gauges = GaugeVector::initial();
    let mut route = RouteState::initial();
    let mut last_seq = 0;

    for event in events {
        last_seq = event.seq;
        match &event.body {
            EventBody::ActionApplied { action, flags, .. } => {
                gauges = gauges::apply_action(&gauges, *action, cfg);
                route = route::advance(&route, &gauges, flags, cfg).state;
            }
            EventBody::SelfcheckSubmitted { .. } => {}
            EventBody::StateReset {} => {
                gauges = GaugeVector::initial();
                route = RouteState::initial();
            }
        }
    }

    ReplayedState {
        gauges,
        route,
        folded_events: events.len(),
        last_seq,
    }
}

fn q(v: f64) -> i64 {
    (v * 1e8) as i64
}

/// Cheap per-transition checkpoint hash over quantized state.
pub fn state_hash(gauges: &GaugeVector, route: &RouteState) -> u64 {
    let mut h = DefaultHasher::new();
    q(gauges.stability).hash(&mut h);
    q(gauges.pressure).hash(&mut h);
    q(gauges.drag).hash(&mut h);
    q(gauges.momentum).hash(&mut h);
    q(gauges.volatility).hash(&mut h);
    q(gauges.recovery).hash(&mut h);
    route.current_index.hash(&mut h);
    q(route.progress).hash(&mut h);
    for trigger in &route.active_triggers {
        trigger.as_str().hash(&mut h);
    }
    h.finish()
}

/// SHA-256 over a canonical fixed-point rendering of the state. Two states
/// with equal digests replayed the same history.
pub fn state_digest(gauges: &GaugeVector, route: &RouteState) -> String {
    let mut canonical = format!(
        "g:{}:{}:{}:{}:{}:{}|r:{}:{}",
        q(gauges.stability),
        q(gauges.pressure),
        q(gauges.drag),
        q(gauges.momentum),
        q(gauges.volatility),
        q(gauges.recovery),
        route.current_index,
        q(route.progress),
    );
    for trigger in &route.active_triggers {
        canonical.push('|');
        canonical.push_str(trigger.as_str());
    }
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
