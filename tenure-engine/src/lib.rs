//! # Tenure Engine - Election and Renewal State Machine
//!
//! The election engine for lease-based leader election. A group of
//! cooperating processes ("candidates") agrees on exactly one active leader
//! at a time without ever communicating directly: mutual exclusion is
//! arbitrated entirely by a shared store's atomic conditional writes, and
//! failover by the store's time-based record expiry.
//!
//! This crate provides:
//! - **[`ElectionEngine`]**: the state machine (acquire, renew, detect loss,
//!   recover) driven by a single cooperative task
//! - **[`ElectionConfig`]**: validated options (group, ttl, retry wait, store
//!   location) with fail-fast construction
//! - **[`ElectionNotificationBus`]**: exactly-once `Elected`/`Revoked`
//!   transition events for downstream application logic
//! - **[`ElectionError`]**: fail-fast configuration errors and propagated
//!   query-path store errors
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tenure_core::MemoryLeaseStore;
//! use tenure_engine::{ElectionConfig, ElectionEngine, LeadershipEvent};
//!
//! # async fn example() -> tenure_engine::ElectionResult<()> {
//! let store = Arc::new(MemoryLeaseStore::new());
//! let config = ElectionConfig::default().with_group("batch-jobs");
//! let engine = Arc::new(ElectionEngine::new(config, store)?);
//!
//! let mut events = engine.notifications().watch();
//! engine.start().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         LeadershipEvent::Elected { .. } => { /* begin leader-only work */ }
//!         LeadershipEvent::Revoked { .. } => { /* stop leader-only work */ }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod notifications;

pub use config::{ElectionConfig, MIN_TTL, MIN_WAIT};
pub use engine::{ElectionEngine, ElectionStats, Phase};
pub use errors::{ElectionError, ElectionResult};
pub use notifications::{
    ElectionNotificationBus, EventFilter, LeadershipEvent, NotificationStats, SubscriptionId,
};
