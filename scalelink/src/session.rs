//! Weighing session
//!
//! One session per button press:
//!
//! ```text
//! Idle ──► Probing ──► Polling ──► Stable
//!             │           ├──────► Unstable     (attempt budget spent)
//!             └───────────┴──────► Unreachable  (ping failed / scale disconnected)
//! ```
//!
//! A session is a single forward pass. [`WeighingSession::run`] consumes it,
//! so a finished session cannot be restarted.

use std::fmt;

use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use scalelink_types::WeightReading;

use crate::client::Scale;
use crate::config::SessionConfig;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not started
    Idle,

    /// Checking that the scale answers at all
    Probing,

    /// Requesting weights until one is stable
    Polling,

    /// A stable weight was read
    Stable,

    /// No stable weight within the attempt budget
    Unstable,

    /// Scale did not answer the probe or dropped the connection
    Unreachable,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stable | Self::Unstable | Self::Unreachable)
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    Stable(WeightReading),
    Unstable,
    Unreachable,
}

impl SessionOutcome {
    /// Terminal state matching this outcome
    pub fn state(&self) -> SessionState {
        match self {
            Self::Stable(_) => SessionState::Stable,
            Self::Unstable => SessionState::Unstable,
            Self::Unreachable => SessionState::Unreachable,
        }
    }

    /// The stable reading, if any
    pub fn reading(&self) -> Option<&WeightReading> {
        match self {
            Self::Stable(reading) => Some(reading),
            _ => None,
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable(reading) => write!(f, "weight {}", reading),
            Self::Unstable => write!(f, "weight did not stabilize"),
            Self::Unreachable => write!(f, "scale unreachable"),
        }
    }
}

/// Result of a finished session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,

    /// Weight polls issued (the probe is not counted)
    pub attempts: usize,
}

/// Single-use weighing session
pub struct WeighingSession<'a, S: Scale + ?Sized> {
    scale: &'a S,
    config: SessionConfig,
    state: SessionState,
    attempts: usize,
}

impl<'a, S: Scale + ?Sized> WeighingSession<'a, S> {
    /// Create a new idle session
    pub fn new(scale: &'a S, config: SessionConfig) -> Self {
        Self {
            scale,
            config,
            state: SessionState::Idle,
            attempts: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        trace!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn finish(mut self, outcome: SessionOutcome) -> SessionReport {
        self.transition(outcome.state());
        info!(attempts = self.attempts, "Session finished: {}", outcome);
        SessionReport {
            outcome,
            attempts: self.attempts,
        }
    }

    /// Probe the scale, then poll until a stable weight or the budget runs out
    pub async fn run(mut self) -> SessionReport {
        self.transition(SessionState::Probing);

        if !self.scale.ping().await {
            return self.finish(SessionOutcome::Unreachable);
        }

        self.transition(SessionState::Polling);

        let max_attempts = self.config.max_attempts;
        for attempt in 1..=max_attempts {
            self.attempts = attempt;

            match self.scale.read_weight().await {
                Ok(reading) if reading.stable => {
                    return self.finish(SessionOutcome::Stable(reading));
                }
                Ok(reading) => {
                    debug!(attempt, max_attempts, "Unstable: {}", reading);
                }
                Err(e) if e.is_disconnect() => {
                    warn!(attempt, "Scale dropped the connection: {}", e);
                    return self.finish(SessionOutcome::Unreachable);
                }
                Err(e) => {
                    warn!(attempt, max_attempts, "Weight request failed: {}", e);
                }
            }

            if attempt < max_attempts {
                sleep(self.config.poll_interval).await;
            }
        }

        self.finish(SessionOutcome::Unstable)
    }
}
