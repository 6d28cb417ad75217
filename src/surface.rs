//! Transport-agnostic command surface.
//!
//! Thin serialization wrapper over the session engine: request/response
//! types and a port trait any transport can sit behind. No logic lives here
//! beyond parsing and delegation.

use serde::{Deserialize, Serialize};

use crate::config::now_ms;
use crate::events::{Event, SelfcheckSubmission};
use crate::ledger::{LedgerError, LedgerStore};
use crate::logging::{self, obj, v_str, Domain, Level};
use crate::projection::ViewModel;
use crate::session::{CommandError, SessionEngine};

#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub ok: bool,
    pub action: String,
    pub advanced: bool,
    pub current_waypoint_id: String,
    pub progress: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfcheckRequest {
    pub alignment: f64,
    pub clarity: f64,
    pub friction: f64,
    pub momentum: f64,
    pub confidence: f64,
    pub recovery: f64,
    pub client_ts_ms: u64,
}

impl SelfcheckRequest {
    fn into_submission(self) -> SelfcheckSubmission {
        SelfcheckSubmission {
            alignment: self.alignment,
            clarity: self.clarity,
            friction: self.friction,
            momentum: self.momentum,
            confidence: self.confidence,
            recovery: self.recovery,
            client_ts_ms: self.client_ts_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelfcheckResponse {
    pub ok: bool,
    pub window_remaining_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayRunResponse {
    pub ok: bool,
    pub folded_events: usize,
    pub digest: String,
    pub matches_live: bool,
    pub config_hash: String,
}

/// The command surface any transport adapter drives.
pub trait SurfacePort {
    fn view(&self) -> ViewModel;
    fn apply_action(&mut self, req: ActionRequest) -> Result<ActionResponse, CommandError>;
    fn submit_selfcheck(&mut self, req: SelfcheckRequest)
        -> Result<SelfcheckResponse, CommandError>;
    fn reset(&mut self) -> Result<ResetResponse, CommandError>;
    fn events(&self, from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError>;
    fn replay_run(&self, from_seq: Option<u64>) -> Result<ReplayRunResponse, LedgerError>;
}

/// In-process port: wall clock in, engine calls out.
pub struct InProcessPort<L: LedgerStore> {
    engine: SessionEngine<L>,
}

impl<L: LedgerStore> InProcessPort<L> {
    pub fn new(engine: SessionEngine<L>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SessionEngine<L> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SessionEngine<L> {
        &mut self.engine
    }
}

impl<L: LedgerStore> SurfacePort for InProcessPort<L> {
    fn view(&self) -> ViewModel {
        self.engine.view()
    }

    fn apply_action(&mut self, req: ActionRequest) -> Result<ActionResponse, CommandError> {
        logging::log(
            Level::Debug,
            Domain::Surface,
            "apply_action",
            obj(&[("action", v_str(&req.action))]),
        );
        let outcome = self.engine.apply_action_str(&req.action, now_ms())?;
        Ok(ActionResponse {
            ok: true,
            action: outcome.action.as_str().to_string(),
            advanced: outcome.advanced,
            current_waypoint_id: outcome.current_waypoint_id,
            progress: outcome.progress,
        })
    }

    fn submit_selfcheck(
        &mut self,
        req: SelfcheckRequest,
    ) -> Result<SelfcheckResponse, CommandError> {
        let outcome = self
            .engine
            .submit_selfcheck(req.into_submission(), now_ms())?;
        Ok(SelfcheckResponse {
            ok: true,
            window_remaining_secs: outcome.window_remaining_secs,
        })
    }

    fn reset(&mut self) -> Result<ResetResponse, CommandError> {
        self.engine.reset(now_ms())?;
        Ok(ResetResponse { ok: true })
    }

    fn events(&self, from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError> {
        self.engine.events(from_seq)
    }

    fn replay_run(&self, from_seq: Option<u64>) -> Result<ReplayRunResponse, LedgerError> {
        let report = self.engine.replay_check(from_seq)?;
        Ok(ReplayRunResponse {
            ok: true,
            folded_events: report.replayed.folded_events,
            digest: report.digest,
            matches_live: report.matches_live,
            config_hash: report.config_hash,
        })
    }
}

// Stub implementation to make integration explicit.
pub struct NullPort;

impl SurfacePort for NullPort {
    fn view(&self) -> ViewModel {
        crate::projection::project(
            &crate::gauges::GaugeVector::initial(),
            &crate::route::RouteState::initial(),
            0,
        )
    }

    fn apply_action(&mut self, req: ActionRequest) -> Result<ActionResponse, CommandError> {
        Ok(ActionResponse {
            ok: true,
            action: req.action,
            advanced: false,
            current_waypoint_id: "anchor".to_string(),
            progress: 0.0,
        })
    }

    fn submit_selfcheck(
        &mut self,
        _req: SelfcheckRequest,
    ) -> Result<SelfcheckResponse, CommandError> {
        Ok(SelfcheckResponse {
            ok: true,
            window_remaining_secs: 0.0,
        })
    }

    fn reset(&mut self) -> Result<ResetResponse, CommandError> {
        Ok(ResetResponse { ok: true })
    }

    fn events(&self, _from_seq: Option<u64>) -> Result<Vec<Event>, LedgerError> {
        Ok(vec![])
    }

    fn replay_run(&self, _from_seq: Option<u64>) -> Result<ReplayRunResponse, LedgerError> {
        Ok(ReplayRunResponse {
            ok: true,
            folded_events: 0,
            digest: String::new(),
            matches_live: true,
            config_hash: String::new(),
        })
    }
}
