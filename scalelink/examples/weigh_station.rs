//! Weighing station: button in, pulse out
//!
//! Every press of the button weighs once; a stable weight pulses the output.
//!
//! ```text
//! SCALE_HOST=192.168.4.137 BUTTON_GPIO=17 PULSE_GPIO=27 \
//!     cargo run --example weigh_station
//! ```
//!
//! The button is read active-low (wired to ground with a pull-up). Set
//! `BUTTON_ACTIVE_LOW=0` for a button that drives the line high.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use scalelink::{ControlConfig, ControlLoop, ScaleClient, ScaleConfig, SysfsGpio};

fn env_pin(key: &str, default: u32) -> anyhow::Result<u32> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} is not a pin number: {:?}", key, value)),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ScaleConfig::from_env().context("loading scale configuration")?;
    let button = env_pin("BUTTON_GPIO", 17)?;
    let pulse = env_pin("PULSE_GPIO", 27)?;
    let active_low = std::env::var("BUTTON_ACTIVE_LOW").map_or(true, |v| v.trim() != "0");

    info!(
        "Scale {} ({}), button gpio{}, pulse gpio{}",
        config.addr(),
        config.variant.name(),
        button,
        pulse
    );

    let io = Arc::new(SysfsGpio::new(button, pulse).with_input_active_low(active_low));
    let control = ControlLoop::new(ScaleClient::new(config), io, ControlConfig::default());

    control.run().await;

    Ok(())
}
