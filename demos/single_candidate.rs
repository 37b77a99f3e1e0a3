//! Single-candidate walkthrough.
//!
//! Starts one engine against an in-memory store, observes the `Elected`
//! transition, pauses and resumes the engine, and prints the leadership
//! status along the way.

use std::sync::Arc;
use std::time::Duration;
use tenure_core::MemoryLeaseStore;
use tenure_engine::{ElectionConfig, ElectionEngine, EventFilter, LeadershipEvent};
use tokio::time::sleep;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Starting single-candidate demo");

    let store = Arc::new(MemoryLeaseStore::new());
    let config = ElectionConfig::default().with_group("demo");
    let engine = Arc::new(ElectionEngine::new(config, store)?);

    let (_subscription, mut events) = engine.notifications().subscribe(EventFilter::All).await;
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                LeadershipEvent::Elected { candidate, group, .. } => {
                    info!("Elected: {} now leads group '{}'", candidate, group);
                }
                LeadershipEvent::Revoked { candidate, group, .. } => {
                    info!("Revoked: {} lost group '{}'", candidate, group);
                }
            }
        }
    });

    engine.start().await?;
    sleep(Duration::from_millis(600)).await;
    info!("is_leader = {}", engine.is_leader().await?);

    info!("Pausing for two ttl windows; the lease will lapse silently");
    engine.pause().await;
    sleep(Duration::from_millis(2200)).await;
    info!("is_leader while paused = {}", engine.is_leader().await?);

    info!("Resuming; the engine re-contests immediately");
    engine.resume().await;
    sleep(Duration::from_millis(600)).await;
    info!("is_leader after resume = {}", engine.is_leader().await?);

    engine.stop();
    info!("Demo complete");
    Ok(())
}
