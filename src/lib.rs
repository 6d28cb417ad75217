//! Deterministic state-simulation core for a status-visualization surface.
//!
//! Six bounded gauges evolve under three operator actions; a waypoint route
//! progresses when the gauges allow it; every transition is an entry in an
//! append-only ledger, and live state is always reproducible by folding that
//! ledger from the fixed starting constants.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Surface    │────►│   Session    │────►│ Gauge/Route  │
//! │  (commands)  │     │   (owner)    │     │  (pure fns)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │                    │
//!                             ▼                    ▼
//!                      ┌──────────────┐     ┌──────────────┐
//!                      │    Ledger    │────►│    Replay    │
//!                      │ (append-only)│     │    (fold)    │
//!                      └──────────────┘     └──────────────┘
//! ```

pub mod config;
pub mod events;
pub mod gauges;
pub mod journal;
pub mod ledger;
pub mod logging;
pub mod projection;
pub mod replay;
pub mod route;
pub mod selfcheck;
pub mod session;
pub mod storage;
pub mod surface;
