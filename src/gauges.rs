//! Pure gauge transition: (gauges, action) -> gauges'.
//!
//! Direct deltas, then coupling, then a hard clamp, in that fixed order.
//! Coupling deltas are measured against the pre-action values so each rule
//! applies exactly once.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// The six bounded status indicators. Every field stays in [0,1] after any
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeVector {
    pub stability: f64,
    pub pressure: f64,
    pub drag: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub recovery: f64,
}

impl GaugeVector {
    /// Session starting constants. Replay folds from here.
    pub fn initial() -> Self {
        Self {
            stability: 0.55,
            pressure: 0.40,
            drag: 0.45,
            momentum: 0.50,
            volatility: 0.35,
            recovery: 0.50,
        }
    }

    pub fn in_bounds(&self) -> bool {
        [
            self.stability,
            self.pressure,
            self.drag,
            self.momentum,
            self.volatility,
            self.recovery,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v) && v.is_finite())
    }
}

/// The three legal operator actions. Nothing else parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Hold,
    Push,
    Drift,
}

impl Action {
    pub fn parse(input: &str) -> Option<Action> {
        match input.to_ascii_uppercase().as_str() {
            "HOLD" => Some(Action::Hold),
            "PUSH" => Some(Action::Push),
            "DRIFT" => Some(Action::Drift),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Hold => "HOLD",
            Action::Push => "PUSH",
            Action::Drift => "DRIFT",
        }
    }
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Apply one action to the gauge vector. Pure and total: any action on any
/// in-bounds vector yields an in-bounds vector.
pub fn apply_action(g: &GaugeVector, action: Action, cfg: &Config) -> GaugeVector {
    let mut next = *g;

    // Phase 1: direct deltas, applied simultaneously.
    match action {
        Action::Hold => {
            next.stability += cfg.delta_hold;
            next.pressure -= cfg.delta_hold;
            next.momentum -= cfg.delta_hold;
        }
        Action::Push => {
            next.momentum += cfg.delta_push;
            next.pressure += cfg.delta_push;
            next.stability -= cfg.delta_push;
        }
        Action::Drift => {
            next.recovery += cfg.delta_drift;
            next.volatility -= cfg.delta_drift;
            next.pressure -= cfg.delta_drift;
        }
    }

    // Phase 2: coupling. Deltas are the direct-phase movements.
    let d_stability = next.stability - g.stability;
    let d_momentum = next.momentum - g.momentum;
    let d_pressure = next.pressure - g.pressure;

    next.volatility -= cfg.k_stability_volatility * d_stability;
    next.drag -= cfg.k_momentum_drag * d_momentum;
    next.volatility += cfg.k_pressure_volatility * d_pressure.max(0.0);
    next.stability += cfg.k_recovery_lift * next.recovery * (1.0 - next.stability);

    // Phase 3: hard clamp.
    next.stability = clamp01(next.stability);
    next.pressure = clamp01(next.pressure);
    next.drag = clamp01(next.drag);
    next.momentum = clamp01(next.momentum);
    next.volatility = clamp01(next.volatility);
    next.recovery = clamp01(next.recovery);

    next
}
