use serde::Serialize;
use sha2::{Digest, Sha256};

/// All tunables of the simulation core.
///
/// Defaults are the documented fixed constants; route pacing and the
/// selfcheck window depend on them staying stable across a session.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// HOLD direct delta (stability up, pressure/momentum down).
    pub delta_hold: f64,
    /// PUSH direct delta (momentum/pressure up, stability down).
    pub delta_push: f64,
    /// DRIFT direct delta (recovery up, volatility/pressure down).
    pub delta_drift: f64,

    /// Stability/volatility inverse coupling coefficient.
    pub k_stability_volatility: f64,
    /// Momentum/drag inverse coupling coefficient.
    pub k_momentum_drag: f64,
    /// Pressure-to-volatility transfer coefficient (positive deltas only).
    pub k_pressure_volatility: f64,
    /// Recovery lift on stability, scaled by remaining headroom.
    pub k_recovery_lift: f64,

    /// Progress added per eligible action.
    pub progress_increment: f64,
    /// Minimum momentum for waypoint progression.
    pub momentum_gate: f64,
    /// Drag at or above this blocks waypoint progression.
    pub drag_ceiling: f64,

    /// Pressure above this raises the risk_over trigger.
    pub pressure_risk_threshold: f64,
    /// Volatility above this (with recovery below the floor) raises strain_high.
    pub volatility_strain_threshold: f64,
    pub recovery_strain_floor: f64,

    /// Selfcheck acceptance window after the most recent applied action.
    pub selfcheck_window_ms: u64,

    pub sqlite_path: String,
    pub journal_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            delta_hold: std::env::var("DELTA_HOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(0.08),
            delta_push: std::env::var("DELTA_PUSH").ok().and_then(|v| v.parse().ok()).unwrap_or(0.10),
            delta_drift: std::env::var("DELTA_DRIFT").ok().and_then(|v| v.parse().ok()).unwrap_or(0.09),
            k_stability_volatility: std::env::var("K_STAB_VOL").ok().and_then(|v| v.parse().ok()).unwrap_or(0.50),
            k_momentum_drag: std::env::var("K_MOM_DRAG").ok().and_then(|v| v.parse().ok()).unwrap_or(0.40),
            k_pressure_volatility: std::env::var("K_PRESS_VOL").ok().and_then(|v| v.parse().ok()).unwrap_or(0.30),
            k_recovery_lift: std::env::var("K_RECOVERY_LIFT").ok().and_then(|v| v.parse().ok()).unwrap_or(0.05),
            progress_increment: std::env::var("PROGRESS_INC").ok().and_then(|v| v.parse().ok()).unwrap_or(0.2),
            momentum_gate: std::env::var("MOMENTUM_GATE").ok().and_then(|v| v.parse().ok()).unwrap_or(0.6),
            drag_ceiling: std::env::var("DRAG_CEILING").ok().and_then(|v| v.parse().ok()).unwrap_or(0.7),
            pressure_risk_threshold: std::env::var("PRESSURE_RISK_TH").ok().and_then(|v| v.parse().ok()).unwrap_or(0.7),
            volatility_strain_threshold: std::env::var("VOL_STRAIN_TH").ok().and_then(|v| v.parse().ok()).unwrap_or(0.8),
            recovery_strain_floor: std::env::var("RECOVERY_STRAIN_FLOOR").ok().and_then(|v| v.parse().ok()).unwrap_or(0.3),
            selfcheck_window_ms: std::env::var("SELFCHECK_WINDOW_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(60_000),
            sqlite_path: std::env::var("SQLITE_PATH").unwrap_or_else(|_| "./session.sqlite".to_string()),
            journal_path: std::env::var("JOURNAL_PATH").unwrap_or_else(|_| "./session.journal".to_string()),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// SHA-256 over the canonical JSON rendering, for run provenance.
    pub fn config_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_json().as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_hash_deterministic() {
        let cfg1 = Config::from_env();
        let cfg2 = Config::from_env();
        assert_eq!(cfg1.config_hash(), cfg2.config_hash());
        assert_eq!(cfg1.config_hash().len(), 64);
    }

    #[test]
    fn test_config_json_contains_pacing_fields() {
        let json = Config::from_env().to_json();
        assert!(json.contains("\"progress_increment\""));
        assert!(json.contains("\"momentum_gate\""));
        assert!(json.contains("\"selfcheck_window_ms\""));
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("config JSON should be valid");
        assert!(parsed.is_object());
    }
}
