//! Waypoint progression and alternate-route triggers.
//!
//! The primary route is static configuration; `RouteState` only ever moves
//! forward, one increment per eligible action, wrapping after the last
//! waypoint. Trigger evaluation is a fixed table of named predicates over the
//! gauge vector plus externally supplied flags.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::gauges::GaugeVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    Origin,
    Checkpoint,
    Rest,
    Junction,
    Terminus,
}

/// A fixed point along the primary route. Never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub position: f64,
    pub kind: WaypointKind,
}

fn wp(id: &str, position: f64, kind: WaypointKind) -> Waypoint {
    Waypoint {
        id: id.to_string(),
        position,
        kind,
    }
}

/// The ordered primary route.
pub fn primary_route() -> Vec<Waypoint> {
    vec![
        wp("anchor", 0.0, WaypointKind::Origin),
        wp("shallows", 0.18, WaypointKind::Checkpoint),
        wp("crossing", 0.38, WaypointKind::Junction),
        wp("terrace", 0.55, WaypointKind::Rest),
        wp("ridge", 0.76, WaypointKind::Checkpoint),
        wp("summit", 1.0, WaypointKind::Terminus),
    ]
}

/// Named alternate-route trigger predicates. The gauge-derived ones are
/// evaluated here; the external ones come in as flags because the underlying
/// condition is not itself a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    RiskOver,
    StrainHigh,
    InfoMissing,
    PolicyGate,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::RiskOver => "risk_over",
            Trigger::StrainHigh => "strain_high",
            Trigger::InfoMissing => "info_missing",
            Trigger::PolicyGate => "policy_gate",
        }
    }
}

/// Externally supplied trigger inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteFlags {
    pub info_missing: bool,
    pub policy_gate: bool,
}

/// A conditionally surfaced secondary path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternateRoute {
    pub trigger: Trigger,
    pub positions: Vec<f64>,
}

/// The fixed alternate-route table.
pub fn alternate_routes() -> Vec<AlternateRoute> {
    vec![
        AlternateRoute {
            trigger: Trigger::RiskOver,
            positions: vec![0.38, 0.30, 0.22, 0.18],
        },
        AlternateRoute {
            trigger: Trigger::StrainHigh,
            positions: vec![0.55, 0.48, 0.55],
        },
        AlternateRoute {
            trigger: Trigger::InfoMissing,
            positions: vec![0.38, 0.38],
        },
        AlternateRoute {
            trigger: Trigger::PolicyGate,
            positions: vec![0.76, 0.60, 0.76],
        },
    ]
}

/// Progression state along the primary route.
///
/// Invariants: `progress` lives in [0,1) and resets to 0 exactly when
/// `current_index` advances; the index wraps to 0 after the last waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteState {
    pub current_index: usize,
    pub progress: f64,
    pub active_triggers: Vec<Trigger>,
}

impl RouteState {
    pub fn initial() -> Self {
        Self {
            current_index: 0,
            progress: 0.0,
            active_triggers: Vec::new(),
        }
    }
}

/// Result of one progression step.
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub state: RouteState,
    pub advanced: bool,
}

fn eligible(gauges: &GaugeVector, cfg: &Config) -> bool {
    gauges.momentum >= cfg.momentum_gate && gauges.drag < cfg.drag_ceiling
}

/// Evaluate the trigger table. All matching triggers are surfaced, in a
/// fixed order so replay and projection agree byte for byte.
pub fn evaluate_triggers(gauges: &GaugeVector, flags: &RouteFlags, cfg: &Config) -> Vec<Trigger> {
    let mut active = Vec::new();
    if gauges.pressure > cfg.pressure_risk_threshold {
        active.push(Trigger::RiskOver);
    }
    if gauges.volatility > cfg.volatility_strain_threshold
        && gauges.recovery < cfg.recovery_strain_floor
    {
        active.push(Trigger::StrainHigh);
    }
    if flags.info_missing {
        active.push(Trigger::InfoMissing);
    }
    if flags.policy_gate {
        active.push(Trigger::PolicyGate);
    }
    active
}

/// Advance the route state for one applied action. Pure.
///
/// Ineligible steps leave progress exactly where it was; it never decreases.
pub fn advance(
    route: &RouteState,
    gauges: &GaugeVector,
    flags: &RouteFlags,
    cfg: &Config,
) -> AdvanceOutcome {
    let route_len = primary_route().len();
    let mut next = route.clone();
    let mut advanced = false;

    if eligible(gauges, cfg) {
        next.progress += cfg.progress_increment;
        if next.progress >= 1.0 {
            next.current_index = (next.current_index + 1) % route_len;
            next.progress = 0.0;
            advanced = true;
        }
    }

    next.active_triggers = evaluate_triggers(gauges, flags, cfg);

    AdvanceOutcome {
        state: next,
        advanced,
    }
}
