//! The election engine: lease acquisition, renewal, and loss detection.

use crate::{ElectionConfig, ElectionNotificationBus, ElectionResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tenure_core::{unix_now_ms, CandidateId, LeaseStore};
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Phase of one candidate's election state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed but not yet started
    Idle,
    /// Attempting or awaiting acquisition
    Electing,
    /// Holds the lease and is renewing it
    Leading,
    /// Suspended; scheduled actions are no-ops until resume
    Paused,
}

/// Counters for election activity
#[derive(Debug, Default, Clone)]
pub struct ElectionStats {
    pub acquire_attempts: u64,
    pub elections_won: u64,
    pub renewals: u64,
    pub leases_lost: u64,
    pub store_errors: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ControlSignal {
    generation: u64,
    shutdown: bool,
}

/// Lease-based election engine for one candidate contesting one group.
///
/// The engine never talks to other candidates. It acquires and renews a lease
/// through the store's atomic conditional writes, detects loss of leadership
/// when a renewal fails to apply, and recovers by falling back to the acquire
/// retry loop. All scheduled actions run one at a time on a single driver
/// task; suspension points are only the calls into the store.
///
/// Timing policy: a leader renews every `ttl / 4`, so up to two consecutive
/// missed renewals are survivable before the lease actually expires. Failed
/// acquires and lost renewals retry after the fixed `wait` interval without
/// backoff, since the dominant failure mode (lease held by another live
/// candidate) resolves within one ttl window.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use tenure_core::MemoryLeaseStore;
/// use tenure_engine::{ElectionConfig, ElectionEngine};
///
/// # async fn example() -> tenure_engine::ElectionResult<()> {
/// let store = Arc::new(MemoryLeaseStore::new());
/// let engine = Arc::new(ElectionEngine::new(ElectionConfig::default(), store)?);
///
/// let mut events = engine.notifications().watch();
/// engine.start().await?;
///
/// // Application logic reacts to Elected / Revoked transitions.
/// let _event = events.recv().await;
/// # Ok(())
/// # }
/// ```
pub struct ElectionEngine<S: LeaseStore> {
    config: ElectionConfig,
    id: CandidateId,
    store: Arc<S>,
    phase: Arc<RwLock<Phase>>,
    // Checked at the top of every scheduled action and again after each store
    // await, so no transition or event can slip out after pause() returns.
    paused: AtomicBool,
    started: AtomicBool,
    notifications: Arc<ElectionNotificationBus>,
    stats: Arc<RwLock<ElectionStats>>,
    control_tx: watch::Sender<ControlSignal>,
    control_rx: watch::Receiver<ControlSignal>,
}

impl<S: LeaseStore + 'static> ElectionEngine<S> {
    /// Creates an engine with a fresh candidate identity.
    ///
    /// Validates the configuration, failing fast on out-of-bounds options.
    /// The identity is random and stable for this engine's lifetime; a
    /// restarted process constructs a new engine and re-contests from
    /// scratch.
    pub fn new(config: ElectionConfig, store: Arc<S>) -> ElectionResult<Self> {
        config.validate()?;
        let (control_tx, control_rx) = watch::channel(ControlSignal::default());

        Ok(Self {
            config,
            id: CandidateId::new(),
            store,
            phase: Arc::new(RwLock::new(Phase::Idle)),
            paused: AtomicBool::new(false),
            started: AtomicBool::new(false),
            notifications: Arc::new(ElectionNotificationBus::new()),
            stats: Arc::new(RwLock::new(ElectionStats::default())),
            control_tx,
            control_rx,
        })
    }

    /// This candidate's identity.
    pub fn id(&self) -> CandidateId {
        self.id
    }

    /// The engine's configuration.
    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    /// The bus carrying this engine's `Elected`/`Revoked` transitions.
    pub fn notifications(&self) -> &Arc<ElectionNotificationBus> {
        &self.notifications
    }

    /// Snapshot of the current phase.
    pub async fn phase(&self) -> Phase {
        if self.paused.load(Ordering::Acquire) {
            return Phase::Paused;
        }
        if !self.started.load(Ordering::Acquire) {
            return Phase::Idle;
        }
        *self.phase.read().await
    }

    /// Get election statistics
    pub async fn get_stats(&self) -> ElectionStats {
        self.stats.read().await.clone()
    }

    /// Begins the election loop. Idempotent.
    ///
    /// Provisions the store's expiry behavior, transitions to `Electing`, and
    /// spawns the driver task, which attempts the first acquire immediately.
    /// Provisioning errors propagate and leave the engine unstarted, so a
    /// later `start()` retries from scratch.
    pub async fn start(self: &Arc<Self>) -> ElectionResult<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Err(e) = self.store.ensure_expiry(self.config.ttl).await {
            self.started.store(false, Ordering::Release);
            return Err(e.into());
        }

        *self.phase.write().await = Phase::Electing;
        info!(
            candidate = %self.id,
            group = %self.config.group,
            location = %self.config.location,
            "Starting election engine"
        );

        tokio::spawn(Arc::clone(self).run());
        Ok(())
    }

    /// Suspends timer-driven actions. Idempotent.
    ///
    /// Takes effect immediately for `is_leader()` and for any scheduled
    /// action that has not yet applied its transition; an action already in
    /// flight completes its store call as a no-op. No `Elected`/`Revoked`
    /// event fires between `pause()` returning and a later `resume()`.
    pub async fn pause(&self) {
        if self.paused.swap(true, Ordering::AcqRel) {
            return;
        }
        *self.phase.write().await = Phase::Paused;
        info!(candidate = %self.id, group = %self.config.group, "Pausing election engine");
        self.control_tx.send_modify(|s| s.generation += 1);
    }

    /// Resumes after a pause and attempts an acquire immediately. Idempotent.
    ///
    /// Always resumes into `Electing`, even if the engine was leading when
    /// paused: if the lease is still live and held by this candidate, the
    /// immediate acquire observes that and transitions straight back to
    /// `Leading`, emitting a fresh `Elected`.
    pub async fn resume(&self) {
        if !self.paused.swap(false, Ordering::AcqRel) {
            return;
        }
        *self.phase.write().await = Phase::Electing;
        info!(candidate = %self.id, group = %self.config.group, "Resuming election engine");
        self.control_tx.send_modify(|s| s.generation += 1);
    }

    /// Shuts the driver task down. Terminal; the engine cannot be restarted.
    ///
    /// Emits no `Revoked`: to every other candidate a stopped leader is
    /// indistinguishable from a crashed one, and its lease simply lapses by
    /// expiry.
    pub fn stop(&self) {
        info!(candidate = %self.id, group = %self.config.group, "Stopping election engine");
        self.control_tx.send_modify(|s| s.shutdown = true);
    }

    /// Whether this candidate holds the lease right now.
    ///
    /// Returns `false` unconditionally while paused or before `start()` has
    /// been called; otherwise performs a read-only probe against the store.
    /// The answer is a point-in-time snapshot, not a guarantee that stays
    /// valid after the call returns. Store errors on this path propagate to
    /// the caller; unlike the autonomous loop, the caller is actively
    /// waiting on this query.
    pub async fn is_leader(&self) -> ElectionResult<bool> {
        if self.paused.load(Ordering::Acquire) || !self.started.load(Ordering::Acquire) {
            return Ok(false);
        }
        let holder = self
            .store
            .current_holder(&self.config.group, unix_now_ms())
            .await?;
        Ok(holder == Some(self.id))
    }

    /// One acquire attempt. Returns the delay before the next scheduled
    /// action.
    ///
    /// Driven by the engine's own loop; exposed for tests and manual
    /// triggering.
    pub async fn elect(&self) -> Duration {
        if self.paused.load(Ordering::Acquire) {
            return self.config.wait;
        }

        let now = unix_now_ms();
        {
            let mut stats = self.stats.write().await;
            stats.acquire_attempts += 1;
        }

        match self.store.try_acquire(&self.config.group, self.id, now).await {
            Ok(holder) if holder == Some(self.id) => {
                // A pause submitted during the store call wins over the
                // acquisition; the lease we just wrote lapses by expiry.
                if self.paused.load(Ordering::Acquire) {
                    return self.config.wait;
                }

                // The phase guard stays held across the publish: a pause()
                // landing now blocks on the phase lock, so it cannot return
                // before the event is out.
                let mut phase = self.phase.write().await;
                if *phase != Phase::Leading {
                    *phase = Phase::Leading;

                    info!(
                        candidate = %self.id,
                        group = %self.config.group,
                        "Acquired leadership"
                    );
                    {
                        let mut stats = self.stats.write().await;
                        stats.elections_won += 1;
                    }
                    self.notifications
                        .notify_elected(self.id, &self.config.group)
                        .await;
                }
                self.config.renew_interval()
            }
            Ok(holder) => {
                debug!(
                    candidate = %self.id,
                    group = %self.config.group,
                    holder = ?holder,
                    "Lease held elsewhere, retrying after wait"
                );
                self.config.wait
            }
            Err(e) => {
                // Treated identically to a failed acquire.
                warn!(
                    candidate = %self.id,
                    group = %self.config.group,
                    error = %e,
                    transient = e.is_transient(),
                    "Acquire failed, retrying after wait"
                );
                let mut stats = self.stats.write().await;
                stats.store_errors += 1;
                self.config.wait
            }
        }
    }

    /// One renewal attempt. Returns the delay before the next scheduled
    /// action.
    ///
    /// A renewal that does not apply (expired record, reaped record, or
    /// another candidate already reclaimed the slot) is a lost lease: the
    /// engine emits `Revoked` and falls back to the acquire retry loop.
    /// Exposed for tests and manual triggering.
    pub async fn renew(&self) -> Duration {
        if self.paused.load(Ordering::Acquire) {
            return self.config.wait;
        }

        let now = unix_now_ms();
        let renewed = match self
            .store
            .try_renew(&self.config.group, self.id, now, self.config.ttl)
            .await
        {
            Ok(renewed) => renewed,
            Err(e) => {
                // Treated identically to a lost lease.
                warn!(
                    candidate = %self.id,
                    group = %self.config.group,
                    error = %e,
                    transient = e.is_transient(),
                    "Renewal errored, treating as lost lease"
                );
                let mut stats = self.stats.write().await;
                stats.store_errors += 1;
                false
            }
        };

        if self.paused.load(Ordering::Acquire) {
            return self.config.wait;
        }

        if renewed {
            debug!(candidate = %self.id, group = %self.config.group, "Renewed lease");
            let mut stats = self.stats.write().await;
            stats.renewals += 1;
            return self.config.renew_interval();
        }

        // As in elect(), the phase guard stays held across the publish so a
        // concurrent pause() cannot return before the event is out.
        let mut phase = self.phase.write().await;
        if *phase == Phase::Leading {
            *phase = Phase::Electing;

            info!(
                candidate = %self.id,
                group = %self.config.group,
                "Lost leadership, re-entering election"
            );
            {
                let mut stats = self.stats.write().await;
                stats.leases_lost += 1;
            }
            self.notifications
                .notify_revoked(self.id, &self.config.group)
                .await;
        }
        self.config.wait
    }

    // The driver: a single task owning the next-action deadline. Scheduled
    // actions execute one at a time; pause revokes the pending deadline by
    // waking the select, resume re-arms it immediately.
    async fn run(self: Arc<Self>) {
        let mut control_rx = self.control_rx.clone();

        // Honor any signal sent between spawn and the first poll: a stop()
        // or pause() issued right after start() must not be lost.
        let primed_shutdown = { control_rx.borrow_and_update().shutdown };
        if primed_shutdown {
            debug!(candidate = %self.id, group = %self.config.group, "Election driver stopped");
            return;
        }

        let mut next_at: Option<Instant> = if self.paused.load(Ordering::Acquire) {
            None
        } else {
            Some(Instant::now())
        };
        loop {
            let sleep = async {
                match next_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = sleep => {
                    next_at = self.tick().await.map(|delay| Instant::now() + delay);
                }
                changed = control_rx.changed() => {
                    if changed.is_err() || control_rx.borrow_and_update().shutdown {
                        break;
                    }
                    // pause() parks the driver, resume() re-arms it for an
                    // immediate acquire. The phase itself was already set by
                    // the caller.
                    next_at = if self.paused.load(Ordering::Acquire) {
                        None
                    } else {
                        Some(Instant::now())
                    };
                }
            }
        }
        debug!(candidate = %self.id, group = %self.config.group, "Election driver stopped");
    }

    // One scheduled action. Guard first: an action queued before a pause is a
    // no-op. Returns the delay to the next action, or None to park.
    async fn tick(&self) -> Option<Duration> {
        if self.paused.load(Ordering::Acquire) {
            return None;
        }

        let phase = *self.phase.read().await;
        match phase {
            Phase::Electing => Some(self.elect().await),
            Phase::Leading => Some(self.renew().await),
            Phase::Idle | Phase::Paused => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::LeadershipEvent;
    use tenure_core::MemoryLeaseStore;

    fn engine_on(store: &Arc<MemoryLeaseStore>) -> ElectionEngine<MemoryLeaseStore> {
        ElectionEngine::new(ElectionConfig::default(), Arc::clone(store)).unwrap()
    }

    #[test]
    fn invalid_config_fails_construction() {
        let store = Arc::new(MemoryLeaseStore::new());
        let config = ElectionConfig::default().with_ttl(Duration::from_millis(10));
        assert!(ElectionEngine::new(config, store).is_err());
    }

    #[tokio::test]
    async fn elect_on_vacant_group_transitions_to_leading() {
        let store = Arc::new(MemoryLeaseStore::new());
        let engine = engine_on(&store);
        let mut events = engine.notifications().watch();

        let delay = engine.elect().await;

        assert_eq!(*engine.phase.read().await, Phase::Leading);
        assert_eq!(delay, engine.config().renew_interval());
        assert!(matches!(
            events.recv().await.unwrap(),
            LeadershipEvent::Elected { .. }
        ));
        assert_eq!(engine.get_stats().await.elections_won, 1);
    }

    #[tokio::test]
    async fn elect_against_held_group_stays_electing() {
        let store = Arc::new(MemoryLeaseStore::new());
        store.ensure_expiry(Duration::from_millis(1000)).await.unwrap();
        store
            .try_acquire("default", CandidateId::from(99), unix_now_ms())
            .await
            .unwrap();

        let engine = engine_on(&store);
        let mut events = engine.notifications().watch();

        let delay = engine.elect().await;

        assert_eq!(*engine.phase.read().await, Phase::Idle);
        assert_eq!(delay, engine.config().wait);
        assert!(events.try_recv().is_err());
        assert_eq!(engine.get_stats().await.acquire_attempts, 1);
        assert_eq!(engine.get_stats().await.elections_won, 0);
    }

    #[tokio::test]
    async fn renew_while_holding_stays_leading() {
        let store = Arc::new(MemoryLeaseStore::new());
        let engine = engine_on(&store);

        engine.elect().await;
        let delay = engine.renew().await;

        assert_eq!(*engine.phase.read().await, Phase::Leading);
        assert_eq!(delay, engine.config().renew_interval());
        assert_eq!(engine.get_stats().await.renewals, 1);
    }

    #[tokio::test]
    async fn lost_renewal_emits_revoked_exactly_once() {
        let store = Arc::new(MemoryLeaseStore::new());
        store.ensure_expiry(Duration::from_millis(1000)).await.unwrap();
        let engine = engine_on(&store);
        let mut events = engine.notifications().watch();

        engine.elect().await;
        assert!(matches!(
            events.recv().await.unwrap(),
            LeadershipEvent::Elected { .. }
        ));

        // Another candidate reclaims the slot after observing the record as
        // expired (its clock runs ahead by a full ttl).
        let thief = CandidateId::from(7);
        let ahead = unix_now_ms() + 2000;
        let holder = store.try_acquire("default", thief, ahead).await.unwrap();
        assert_eq!(holder, Some(thief));

        let delay = engine.renew().await;
        assert_eq!(*engine.phase.read().await, Phase::Electing);
        assert_eq!(delay, engine.config().wait);
        assert!(matches!(
            events.recv().await.unwrap(),
            LeadershipEvent::Revoked { .. }
        ));
        assert_eq!(engine.get_stats().await.leases_lost, 1);

        // A second failed renewal while already electing is not another loss.
        engine.renew().await;
        assert!(events.try_recv().is_err());
        assert_eq!(engine.get_stats().await.leases_lost, 1);
    }

    #[tokio::test]
    async fn paused_actions_are_no_ops() {
        let store = Arc::new(MemoryLeaseStore::new());
        let engine = engine_on(&store);
        let mut events = engine.notifications().watch();

        engine.pause().await;
        engine.elect().await;
        engine.renew().await;

        assert!(events.try_recv().is_err());
        assert_eq!(engine.get_stats().await.acquire_attempts, 0);
        assert!(store.record("default").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn no_event_slips_out_after_pause_returns() {
        // Race an acquire against a pause, repeatedly. Whatever the
        // interleaving, an Elected must be fully published before pause()
        // returns, so the publish counter is stable once it has.
        for _ in 0..50 {
            let store = Arc::new(MemoryLeaseStore::new());
            let engine = Arc::new(engine_on(&store));
            let contender = Arc::clone(&engine);
            let in_flight = tokio::spawn(async move { contender.elect().await });

            engine.pause().await;
            let published = engine.notifications().get_stats().await.events_published;

            in_flight.await.unwrap();
            let settled = engine.notifications().get_stats().await.events_published;
            assert_eq!(published, settled, "event published after pause() returned");
        }
    }

    #[tokio::test]
    async fn pause_and_resume_are_idempotent() {
        let store = Arc::new(MemoryLeaseStore::new());
        let engine = engine_on(&store);

        engine.pause().await;
        engine.pause().await;
        assert_eq!(engine.phase().await, Phase::Paused);

        engine.resume().await;
        engine.resume().await;
        assert_ne!(engine.phase().await, Phase::Paused);
    }

    #[tokio::test]
    async fn is_leader_is_false_before_start_and_while_paused() {
        let store = Arc::new(MemoryLeaseStore::new());
        let engine = Arc::new(engine_on(&store));

        assert!(!engine.is_leader().await.unwrap());

        engine.start().await.unwrap();
        engine.elect().await;
        assert!(engine.is_leader().await.unwrap());

        engine.pause().await;
        assert!(!engine.is_leader().await.unwrap());

        engine.stop();
    }

    #[tokio::test]
    async fn start_is_idempotent_and_provisions_expiry() {
        let store = Arc::new(MemoryLeaseStore::new());
        let engine = Arc::new(engine_on(&store));

        engine.start().await.unwrap();
        engine.start().await.unwrap();

        assert_eq!(store.provisioned_ttl(), Some(Duration::from_millis(1000)));
        engine.stop();
    }

    #[tokio::test]
    async fn resume_while_lease_still_live_re_elects_immediately() {
        let store = Arc::new(MemoryLeaseStore::new());
        let engine = engine_on(&store);
        let mut events = engine.notifications().watch();

        engine.elect().await;
        events.recv().await.unwrap();

        engine.pause().await;
        engine.resume().await;

        // The immediate acquire observes our own live record.
        engine.elect().await;
        assert!(matches!(
            events.recv().await.unwrap(),
            LeadershipEvent::Elected { .. }
        ));
    }
}
