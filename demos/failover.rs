//! Two-candidate failover simulation.
//!
//! Two engines contest the same group through one shared store. The first
//! wins, renews for a while, then pauses; its lease ages out and the second
//! candidate claims the slot on its next retry.

use std::sync::Arc;
use std::time::Duration;
use tenure_core::MemoryLeaseStore;
use tenure_engine::{ElectionConfig, ElectionEngine, LeadershipEvent};
use tokio::time::sleep;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting failover demo");

    let store = Arc::new(MemoryLeaseStore::new());
    let config = ElectionConfig::default().with_group("failover-demo");

    let first = Arc::new(ElectionEngine::new(config.clone(), Arc::clone(&store))?);
    let second = Arc::new(ElectionEngine::new(config, Arc::clone(&store))?);
    info!("Candidate A = {}", first.id());
    info!("Candidate B = {}", second.id());

    for engine in [&first, &second] {
        let mut events = engine.notifications().watch();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    LeadershipEvent::Elected { candidate, .. } => {
                        info!("Elected: {}", candidate);
                    }
                    LeadershipEvent::Revoked { candidate, .. } => {
                        info!("Revoked: {}", candidate);
                    }
                }
            }
        });
    }

    first.start().await?;
    sleep(Duration::from_millis(300)).await;
    second.start().await?;

    sleep(Duration::from_millis(800)).await;
    info!(
        "A leads: {}, B leads: {}",
        first.is_leader().await?,
        second.is_leader().await?
    );

    info!("Pausing candidate A; its lease will expire without renewal");
    first.pause().await;

    // Failover completes within ttl + wait of A's last renewal.
    sleep(Duration::from_millis(2500)).await;
    info!(
        "A leads: {}, B leads: {}",
        first.is_leader().await?,
        second.is_leader().await?
    );

    let stats = second.get_stats().await;
    info!(
        "B attempted {} acquires before winning {}",
        stats.acquire_attempts, stats.elections_won
    );

    first.stop();
    second.stop();
    info!("Demo complete");
    Ok(())
}
