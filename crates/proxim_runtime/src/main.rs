//! Proxim Runtime
//!
//! Demo driver: spawns a deterministic population, advances ticks and
//! queries distances through the per-tick cache.

mod session;

use anyhow::{Context, Result};
use proxim_services::Settings;
use session::Session;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Proxim v{}", proxim_core::VERSION);

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&path).with_context(|| format!("loading {path}"))?,
        None => Settings::default(),
    };
    tracing::info!(
        entities = settings.simulation.entity_count,
        ticks = settings.simulation.ticks,
        parallel_threshold = settings.distance.parallel_threshold,
        verify = settings.distance.verify_rebuilds,
        "settings loaded"
    );

    let mut session = Session::new(&settings);
    for _ in 0..settings.simulation.ticks {
        session.step().context("simulation tick failed")?;
    }
    session.report();

    Ok(())
}
