//! # In-Memory Lease Store
//!
//! Reference implementation of the [`LeaseStore`] contract backed by a
//! concurrent map. Used by tests and demos; also a template for real adapters
//! (the per-group atomic section here corresponds to a conditional write in a
//! durable store).

use crate::{CandidateId, LeaseRecord, LeaseResult, LeaseStore};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// In-memory lease store with per-group atomicity.
///
/// Each group maps to at most one [`LeaseRecord`]. Atomicity of
/// `try_acquire`/`try_renew` comes from holding the map's entry lock across
/// the check-and-write. Expiry is modeled two ways, as in real stores: the
/// acquire path recomputes liveness against the provisioned ttl on every
/// call, and [`evict_expired`](MemoryLeaseStore::evict_expired) plays the role
/// of the store's background reaper.
pub struct MemoryLeaseStore {
    location: String,
    records: DashMap<String, LeaseRecord>,
    // Milliseconds; 0 until ensure_expiry provisions it.
    expiry_ttl_ms: AtomicU64,
}

impl MemoryLeaseStore {
    /// Creates an empty store under the default location name.
    pub fn new() -> Self {
        Self::with_location("leader")
    }

    /// Creates an empty store labelled with a location identifier.
    ///
    /// The location only namespaces log output; records are keyed by group.
    pub fn with_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            records: DashMap::new(),
            expiry_ttl_ms: AtomicU64::new(0),
        }
    }

    /// The provisioned expiry ttl, if `ensure_expiry` has been called.
    pub fn provisioned_ttl(&self) -> Option<Duration> {
        match self.expiry_ttl_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Returns a copy of the record currently stored for `group`, live or not.
    pub fn record(&self, group: &str) -> Option<LeaseRecord> {
        self.records.get(group).map(|r| r.value().clone())
    }

    /// Discards records whose age at `now` exceeds the provisioned ttl.
    ///
    /// Models the store-side reaper that runs independently of any candidate.
    /// Returns the number of records removed. A no-op until `ensure_expiry`
    /// has provisioned a ttl.
    pub fn evict_expired(&self, now: u64) -> usize {
        let Some(ttl) = self.provisioned_ttl() else {
            return 0;
        };
        let before = self.records.len();
        self.records.retain(|_, record| record.is_live(now, ttl));
        let removed = before - self.records.len();
        if removed > 0 {
            debug!(
                location = %self.location,
                removed, "Evicted expired lease records"
            );
        }
        removed
    }

    fn record_is_live(&self, record: &LeaseRecord, now: u64) -> bool {
        // Records in an unprovisioned store never expire.
        match self.provisioned_ttl() {
            Some(ttl) => record.is_live(now, ttl),
            None => true,
        }
    }
}

impl Default for MemoryLeaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn ensure_expiry(&self, ttl: Duration) -> LeaseResult<()> {
        self.expiry_ttl_ms
            .store(ttl.as_millis() as u64, Ordering::Release);
        debug!(location = %self.location, ttl_ms = ttl.as_millis() as u64, "Provisioned lease expiry");
        Ok(())
    }

    async fn try_acquire(
        &self,
        group: &str,
        candidate: CandidateId,
        now: u64,
    ) -> LeaseResult<Option<CandidateId>> {
        // The entry guard is the atomic section: no other caller can observe
        // or mutate this group's record between the liveness check and the
        // write.
        let holder = match self.records.entry(group.to_string()) {
            Entry::Occupied(mut occupied) => {
                if self.record_is_live(occupied.get(), now) {
                    occupied.get().holder
                } else {
                    debug!(location = %self.location, group, %candidate, "Reclaiming expired lease");
                    *occupied.get_mut() = LeaseRecord::new(group, candidate, now);
                    candidate
                }
            }
            Entry::Vacant(vacant) => {
                debug!(location = %self.location, group, %candidate, "Acquiring vacant lease");
                vacant.insert(LeaseRecord::new(group, candidate, now));
                candidate
            }
        };

        Ok(Some(holder))
    }

    async fn try_renew(
        &self,
        group: &str,
        candidate: CandidateId,
        now: u64,
        ttl: Duration,
    ) -> LeaseResult<bool> {
        let renewed = match self.records.entry(group.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get();
                if record.holder == candidate && record.is_live(now, ttl) {
                    occupied.get_mut().acquired_at = now;
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(_) => false,
        };

        if !renewed {
            debug!(location = %self.location, group, %candidate, "Renewal did not apply");
        }
        Ok(renewed)
    }

    async fn current_holder(&self, group: &str, now: u64) -> LeaseResult<Option<CandidateId>> {
        Ok(self
            .records
            .get(group)
            .filter(|record| self.record_is_live(record, now))
            .map(|record| record.holder))
    }
}
