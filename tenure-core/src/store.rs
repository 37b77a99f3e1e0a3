//! # Lease Store Contract
//!
//! The adapter contract the election engine consumes. The store itself (its
//! atomic conditional-write semantics, unique-key enforcement on `group`, and
//! time-based record expiry) is an external collaborator; this trait only
//! names the operations the engine depends on.

use crate::{CandidateId, LeaseResult};
use async_trait::async_trait;
use std::time::Duration;

/// Atomic lease operations over a shared durable store.
///
/// Any store offering compare-and-set style conditional writes keyed by a
/// unique group identifier, plus a time-based auto-expiry mechanism, can
/// satisfy this contract. All coordination between candidates happens through
/// these operations; candidates never talk to each other.
///
/// Every operation takes `now` (milliseconds since the Unix epoch) from the
/// caller so that liveness is computed against the clock of the atomic
/// comparison, not the clock of some earlier read.
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Idempotently provisions the store's expiry behavior.
    ///
    /// Invoked once at first engine start. The store is responsible for
    /// eventually discarding records whose `acquired_at` has aged past `ttl`,
    /// independent of any candidate's liveness. This is what lets a crashed
    /// leader's slot become contestable without manual intervention.
    async fn ensure_expiry(&self, ttl: Duration) -> LeaseResult<()>;

    /// Atomically acquires the lease for `group` if no live record exists.
    ///
    /// If `group` currently has no live record, writes a record with
    /// `holder = candidate, acquired_at = now` and returns the new holder.
    /// If a live record exists, leaves it untouched and returns its holder.
    /// The check-and-write must be atomic with respect to concurrent callers
    /// from other processes: when several candidates race on the same group
    /// at the same instant, exactly one observes itself as the resulting
    /// holder.
    ///
    /// The existence check is scoped strictly to `group`; records for other
    /// groups in the same store location never affect the outcome.
    async fn try_acquire(
        &self,
        group: &str,
        candidate: CandidateId,
        now: u64,
    ) -> LeaseResult<Option<CandidateId>>;

    /// Atomically extends the lease for `group` if `candidate` still holds it.
    ///
    /// Updates `acquired_at = now` only if the current record's holder is
    /// `candidate` **and** the record is still live under `ttl` at `now`.
    /// Returns whether the update applied. A `false` return means the lease
    /// was lost: expired, reaped, or reclaimed by another candidate.
    async fn try_renew(
        &self,
        group: &str,
        candidate: CandidateId,
        now: u64,
        ttl: Duration,
    ) -> LeaseResult<bool>;

    /// Read-only probe: the holder of `group`'s live record, if any.
    ///
    /// Used by the `is_leader` query path. The answer is a point-in-time
    /// snapshot and may be stale the moment it returns.
    async fn current_holder(&self, group: &str, now: u64) -> LeaseResult<Option<CandidateId>>;
}
