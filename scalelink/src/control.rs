//! Button-driven control loop
//!
//! Samples the input line; each press runs one weighing session. A stable
//! weight fires an output pulse on a detached task so the loop keeps
//! sampling while the pulse is active. After a press the loop waits out a
//! cooldown and then for the button to be released, so a held button
//! triggers exactly one session.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::client::Scale;
use crate::config::ControlConfig;
use crate::gpio::{DigitalIo, InputState, OutputState};
use crate::session::{SessionOutcome, WeighingSession};

/// Control loop over one scale and one pair of I/O lines
pub struct ControlLoop<S, G> {
    scale: S,
    io: Arc<G>,
    config: ControlConfig,
}

impl<S, G> ControlLoop<S, G>
where
    S: Scale,
    G: DigitalIo + 'static,
{
    pub fn new(scale: S, io: Arc<G>, config: ControlConfig) -> Self {
        Self { scale, io, config }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Handle the input line once
    ///
    /// Returns `None` when the button is not pressed. Otherwise runs a
    /// session, fires the pulse on a stable weight and returns only after the
    /// cooldown has elapsed and the button has been released.
    pub async fn step(&self) -> Option<SessionOutcome> {
        if self.io.read_input() != InputState::Active {
            return None;
        }

        info!("Button pressed, starting weighing session");

        let report = WeighingSession::new(&self.scale, self.config.session)
            .run()
            .await;

        match &report.outcome {
            SessionOutcome::Stable(reading) => {
                info!("Stable weight {} after {} polls", reading, report.attempts);
                self.spawn_pulse();
            }
            SessionOutcome::Unstable => {
                warn!("Weight did not stabilize after {} polls", report.attempts);
            }
            SessionOutcome::Unreachable => {
                warn!("Scale unreachable");
            }
        }

        sleep(self.config.cooldown).await;
        self.wait_for_release().await;

        Some(report.outcome)
    }

    /// Run forever
    ///
    /// The output line is driven inactive before the first sample.
    pub async fn run(&self) {
        self.io.set_output(OutputState::Inactive);
        info!(
            "Control loop ready (poll every {:?})",
            self.config.poll_interval
        );

        loop {
            self.step().await;
            sleep(self.config.poll_interval).await;
        }
    }

    async fn wait_for_release(&self) {
        if self.io.read_input() == InputState::Active {
            debug!("Waiting for button release");
        }

        while self.io.read_input() == InputState::Active {
            sleep(self.config.poll_interval).await;
        }
    }

    fn spawn_pulse(&self) {
        let io = Arc::clone(&self.io);
        let duration = self.config.pulse_duration;

        tokio::spawn(async move {
            io.set_output(OutputState::Active);
            sleep(duration).await;
            io.set_output(OutputState::Inactive);
            debug!("Output pulse finished");
        });
    }
}
