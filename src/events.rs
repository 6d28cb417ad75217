//! Domain events: the append-only record every transition folds from.

use serde::{Deserialize, Serialize};

use crate::gauges::{Action, GaugeVector};
use crate::route::RouteFlags;

/// A bounded self-report correlated to the most recent applied action.
/// Log-only: never feeds back into the gauge vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfcheckSubmission {
    pub alignment: f64,
    pub clarity: f64,
    pub friction: f64,
    pub momentum: f64,
    pub confidence: f64,
    pub recovery: f64,
    pub client_ts_ms: u64,
}

impl SelfcheckSubmission {
    pub fn in_bounds(&self) -> bool {
        [
            self.alignment,
            self.clarity,
            self.friction,
            self.momentum,
            self.confidence,
            self.recovery,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v) && v.is_finite())
    }
}

/// Event payloads. The action entry snapshots the resulting state and the
/// flags in effect so replay never depends on live inputs, and the quantized
/// state hash gives per-event checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventBody {
    #[serde(rename = "action_applied")]
    ActionApplied {
        action: Action,
        flags: RouteFlags,
        gauges: GaugeVector,
        route_index: usize,
        route_progress: f64,
        state_hash: u64,
    },
    #[serde(rename = "selfcheck_submitted")]
    SelfcheckSubmitted { submission: SelfcheckSubmission },
    #[serde(rename = "state_reset")]
    StateReset {},
}

impl EventBody {
    pub fn kind(&self) -> &'static str {
        match self {
            EventBody::ActionApplied { .. } => "action_applied",
            EventBody::SelfcheckSubmitted { .. } => "selfcheck_submitted",
            EventBody::StateReset {} => "state_reset",
        }
    }
}

/// One ledger entry. `seq` is assigned by the ledger: strictly increasing
/// from 1, gapless, never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub occurred_at_ms: u64,
    #[serde(flatten)]
    pub body: EventBody,
}
