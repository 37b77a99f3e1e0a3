//! # Core Types
//!
//! Fundamental types shared by the election engine and lease store adapters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a candidate contesting leadership.
///
/// Each process contesting a group generates exactly one identity at engine
/// construction, stable for the lifetime of that process. A restarted process
/// gets a fresh identity and must re-contest the lease from scratch; there is
/// no identity persistence across restarts.
///
/// # Examples
///
/// ```rust
/// use tenure_core::CandidateId;
///
/// let id = CandidateId::new();
/// println!("Candidate: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub Uuid);

impl CandidateId {
    /// Creates a new random, collision-resistant candidate identity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tenure_core::CandidateId;
    ///
    /// let id = CandidateId::new();
    /// assert_ne!(id, CandidateId::new()); // Should be unique
    /// ```
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CandidateId {
    fn from(id: u64) -> Self {
        // Convert u64 to UUID for testing purposes
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&id.to_be_bytes());
        Self(Uuid::from_bytes(bytes))
    }
}

/// A lease record as held by the store for one contested group.
///
/// The store keeps at most one record per `group` (enforced by the store's
/// uniqueness constraint, not by the engine). Whether a record still confers
/// leadership is a derived, time-dependent property: a record is *live* while
/// `now - acquired_at < ttl`, and must be re-evaluated against the current
/// clock by whichever operation reads it.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tenure_core::{CandidateId, LeaseRecord};
///
/// let record = LeaseRecord::new("default", CandidateId::new(), 10_000);
/// assert!(record.is_live(10_500, Duration::from_millis(1000)));
/// assert!(!record.is_live(11_000, Duration::from_millis(1000)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRecord {
    /// The contested leadership slot this record belongs to
    pub group: String,
    /// Identity of the candidate currently believed to hold the lease
    pub holder: CandidateId,
    /// Milliseconds since the Unix epoch of the most recent acquire-or-renew
    pub acquired_at: u64,
}

impl LeaseRecord {
    /// Creates a record for `group` held by `holder`, acquired at `acquired_at`.
    pub fn new(group: impl Into<String>, holder: CandidateId, acquired_at: u64) -> Self {
        Self {
            group: group.into(),
            holder,
            acquired_at,
        }
    }

    /// Returns whether this record is live at `now` under `ttl`.
    ///
    /// Liveness is strict: a record whose age equals the ttl exactly is
    /// already expired and recontestable.
    pub fn is_live(&self, now: u64, ttl: Duration) -> bool {
        now.saturating_sub(self.acquired_at) < ttl.as_millis() as u64
    }
}

/// Returns the current wall-clock time as milliseconds since the Unix epoch.
///
/// This is the `now` every engine-side store call is stamped with. Clock skew
/// between candidates is tolerated up to the slack built into the renewal
/// cadence (a leader renews four times per expiry window).
pub fn unix_now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
