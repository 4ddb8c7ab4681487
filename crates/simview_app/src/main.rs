//! # simview_app — decay demo
//!
//! Spawns a batch of entities with staggered decay windows, then drives an
//! [`ExpiryChecker`] over simulated time until everything has expired.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simview_decay::{Decay, ExpiryChecker};
use simview_store::MemoryStore;

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("simview_app=info".parse()?))
        .init();

    info!("decay demo starting");

    let mut store = MemoryStore::new();
    for i in 0..10u32 {
        let entity = store.spawn();
        store.set_component(
            entity,
            &Decay {
                start_time: 0.0,
                end_time: f64::from(i + 1) * 10.0,
            },
        )?;
    }
    info!(entities = store.entity_count(), "spawned decaying entities");

    let mut checker = ExpiryChecker::new();
    checker.start(&mut store)?;

    let mut now = 0.0;
    while store.entity_count() > 0 {
        now += 10.0;
        let destroyed = checker.tick(&mut store, now)?;
        info!(
            now,
            destroyed,
            tracked = checker.tracked_count(),
            remaining = store.entity_count(),
            "tick"
        );
    }

    checker.stop(&mut store)?;
    info!("decay demo finished");
    Ok(())
}
