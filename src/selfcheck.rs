//! Selfcheck correlation window.
//!
//! A submission attaches to the most recent applied action only while the
//! window is open. The check is passive (evaluated at submission time, no
//! timers) and every applied action re-opens the window.

use serde::Serialize;

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowExpired {
    pub elapsed_secs: f64,
    pub window_secs: f64,
}

/// An accepted submission's window accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStatus {
    pub elapsed_secs: f64,
    pub remaining_secs: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelfcheckCorrelator {
    /// Wall time of the most recent applied action; None before the first
    /// action or after a reset.
    last_action_ms: Option<u64>,
    session_started_ms: u64,
}

impl SelfcheckCorrelator {
    pub fn new(session_started_ms: u64) -> Self {
        Self {
            last_action_ms: None,
            session_started_ms,
        }
    }

    /// Called on every committed ACTION_APPLIED, used or not.
    pub fn open_window(&mut self, now_ms: u64) {
        self.last_action_ms = Some(now_ms);
    }

    /// Called on reset: no action to correlate against anymore.
    pub fn close_window(&mut self) {
        self.last_action_ms = None;
    }

    /// Accept iff `now - last_action <= window`. With no window open, the
    /// rejection reports elapsed time since session start.
    pub fn accept(&self, now_ms: u64, window_ms: u64) -> Result<WindowStatus, WindowExpired> {
        let window_secs = window_ms as f64 / 1000.0;
        match self.last_action_ms {
            Some(last) => {
                let elapsed_ms = now_ms.saturating_sub(last);
                let elapsed_secs = elapsed_ms as f64 / 1000.0;
                if elapsed_ms <= window_ms {
                    Ok(WindowStatus {
                        elapsed_secs,
                        remaining_secs: window_secs - elapsed_secs,
                    })
                } else {
                    Err(WindowExpired {
                        elapsed_secs,
                        window_secs,
                    })
                }
            }
            None => Err(WindowExpired {
                elapsed_secs: now_ms.saturating_sub(self.session_started_ms) as f64 / 1000.0,
                window_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW_MS: u64 = 60_000;

    #[test]
    fn test_no_window_before_first_action() {
        let correlator = SelfcheckCorrelator::new(0);
        let err = correlator.accept(5_000, WINDOW_MS).unwrap_err();
        assert_eq!(err.elapsed_secs, 5.0);
    }

    #[test]
    fn test_window_edges() {
        let mut correlator = SelfcheckCorrelator::new(0);
        correlator.open_window(10_000);

        let ok = correlator.accept(10_000 + 59_900, WINDOW_MS).unwrap();
        assert!(ok.remaining_secs > 0.0 && ok.remaining_secs < 0.2);

        // Exactly at the boundary is still inside.
        assert!(correlator.accept(10_000 + 60_000, WINDOW_MS).is_ok());

        let err = correlator.accept(10_000 + 60_100, WINDOW_MS).unwrap_err();
        assert!(err.elapsed_secs > err.window_secs);
    }

    #[test]
    fn test_new_action_reopens_window() {
        let mut correlator = SelfcheckCorrelator::new(0);
        correlator.open_window(0);
        assert!(correlator.accept(90_000, WINDOW_MS).is_err());
        correlator.open_window(90_000);
        assert!(correlator.accept(90_500, WINDOW_MS).is_ok());
    }

    #[test]
    fn test_close_window_rejects() {
        let mut correlator = SelfcheckCorrelator::new(0);
        correlator.open_window(1_000);
        correlator.close_window();
        assert!(correlator.accept(1_500, WINDOW_MS).is_err());
    }
}
