//! Notification channel for leadership transitions.
//!
//! Events fire exactly once per transition: `Elected` on every transition
//! into leading, `Revoked` on every transition out of it. An initial failed
//! acquisition never produces an event.

use std::collections::HashMap;
use std::sync::Arc;
use tenure_core::{unix_now_ms, CandidateId};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// A leadership transition observed by one candidate's engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadershipEvent {
    /// This candidate acquired the lease and is now leading
    Elected {
        candidate: CandidateId,
        group: String,
        timestamp: u64,
    },

    /// This candidate lost the lease it previously held
    Revoked {
        candidate: CandidateId,
        group: String,
        timestamp: u64,
    },
}

impl LeadershipEvent {
    /// The group the transition happened in.
    pub fn group(&self) -> &str {
        match self {
            Self::Elected { group, .. } | Self::Revoked { group, .. } => group,
        }
    }
}

/// Subscription filter for leadership events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Receive every transition
    All,
    /// Receive only `Elected` transitions
    Elected,
    /// Receive only `Revoked` transitions
    Revoked,
}

impl EventFilter {
    fn matches(&self, event: &LeadershipEvent) -> bool {
        match self {
            Self::All => true,
            Self::Elected => matches!(event, LeadershipEvent::Elected { .. }),
            Self::Revoked => matches!(event, LeadershipEvent::Revoked { .. }),
        }
    }
}

/// Unique identifier for a subscription
pub type SubscriptionId = Uuid;

/// Statistics about event delivery
#[derive(Debug, Default, Clone)]
pub struct NotificationStats {
    pub events_published: u64,
    pub events_delivered: u64,
    pub events_dropped: u64,
    pub active_subscriptions: usize,
}

type SubscriberMap = HashMap<SubscriptionId, (EventFilter, mpsc::UnboundedSender<LeadershipEvent>)>;

/// Notification bus carrying `Elected`/`Revoked` transitions to subscribers.
///
/// Offers both a broadcast channel (every subscriber sees every event) and
/// filtered per-subscriber channels. The engine publishes; application logic
/// subscribes.
pub struct ElectionNotificationBus {
    broadcast_tx: broadcast::Sender<LeadershipEvent>,
    subscribers: Arc<RwLock<SubscriberMap>>,
    stats: Arc<RwLock<NotificationStats>>,
}

impl Default for ElectionNotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ElectionNotificationBus {
    /// Create a new notification bus
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create with custom broadcast buffer size
    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(capacity);

        Self {
            broadcast_tx,
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(NotificationStats::default())),
        }
    }

    /// Subscribe to every event through the broadcast channel.
    pub fn watch(&self) -> broadcast::Receiver<LeadershipEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Subscribe with a filter; returns the subscription handle and receiver.
    pub async fn subscribe(
        &self,
        filter: EventFilter,
    ) -> (SubscriptionId, mpsc::UnboundedReceiver<LeadershipEvent>) {
        let subscription_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut subscribers = self.subscribers.write().await;
            subscribers.insert(subscription_id, (filter, tx));

            let mut stats = self.stats.write().await;
            stats.active_subscriptions = subscribers.len();
        }

        debug!("Created subscription {}", subscription_id);
        (subscription_id, rx)
    }

    /// Unsubscribe from events
    pub async fn unsubscribe(&self, subscription_id: SubscriptionId) {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.remove(&subscription_id).is_some() {
            debug!("Removed subscription {}", subscription_id);

            let mut stats = self.stats.write().await;
            stats.active_subscriptions = subscribers.len();
        }
    }

    /// Publish an `Elected` transition.
    pub async fn notify_elected(&self, candidate: CandidateId, group: impl Into<String>) {
        self.publish(LeadershipEvent::Elected {
            candidate,
            group: group.into(),
            timestamp: unix_now_ms(),
        })
        .await;
    }

    /// Publish a `Revoked` transition.
    pub async fn notify_revoked(&self, candidate: CandidateId, group: impl Into<String>) {
        self.publish(LeadershipEvent::Revoked {
            candidate,
            group: group.into(),
            timestamp: unix_now_ms(),
        })
        .await;
    }

    /// Get delivery statistics
    pub async fn get_stats(&self) -> NotificationStats {
        self.stats.read().await.clone()
    }

    /// Get number of active filtered subscriptions
    pub async fn subscription_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn publish(&self, event: LeadershipEvent) {
        {
            let mut stats = self.stats.write().await;
            stats.events_published += 1;
        }

        // A send error just means nobody holds a broadcast receiver.
        let _ = self.broadcast_tx.send(event.clone());

        let subscribers = self.subscribers.read().await;
        let mut delivered = 0u64;
        let mut dropped = 0u64;

        for (filter, tx) in subscribers.values() {
            if filter.matches(&event) {
                match tx.send(event.clone()) {
                    Ok(_) => delivered += 1,
                    Err(_) => {
                        dropped += 1;
                        warn!("Failed to deliver leadership event to subscriber");
                    }
                }
            }
        }
        drop(subscribers);

        let mut stats = self.stats.write().await;
        stats.events_delivered += delivered;
        stats.events_dropped += dropped;
    }
}
