//! Read one weight from a scale
//!
//! ```text
//! SCALE_HOST=192.168.4.137 cargo run --example read_weight
//! ```

use anyhow::Context;
use scalelink::{Scale, ScaleClient, ScaleConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ScaleConfig::from_env().context("loading scale configuration")?;
    println!("Scale {} ({} protocol)", config.addr(), config.variant.name());

    let client = ScaleClient::new(config);

    if let Err(e) = client.probe().await {
        println!("Scale did not answer: {}", e);
        return Ok(());
    }

    let reading = client.read_weight().await?;
    println!("{}", reading);

    Ok(())
}
