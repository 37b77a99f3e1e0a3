//! # Tenure Core - Lease-Based Leader Election Primitives
//!
//! Core building blocks for lease-based leader election over a shared durable
//! store. Candidates never communicate with each other: mutual exclusion rests
//! entirely on the store's atomic conditional writes and time-based record
//! expiry.
//!
//! ## Components
//!
//! - **[`LeaseStore`] trait**: the adapter contract an election engine
//!   consumes: atomic `try_acquire`/`try_renew`, a read-only holder probe,
//!   and idempotent expiry provisioning
//! - **[`CandidateId`] / [`LeaseRecord`]**: candidate identity and the record
//!   shape stores hold per contested group
//! - **[`MemoryLeaseStore`]**: in-memory reference implementation used by
//!   tests, demos, and as a template for real adapters
//! - **[`LeaseError`]**: store-facing error taxonomy with transient
//!   classification
//!
//! ## Writing an adapter
//!
//! ```rust
//! use tenure_core::{CandidateId, LeaseStore, MemoryLeaseStore};
//!
//! # async fn example() {
//! let store = MemoryLeaseStore::new();
//! let me = CandidateId::new();
//!
//! // Exactly one concurrent caller observes itself as the holder.
//! let holder = store.try_acquire("default", me, 1_000).await.unwrap();
//! assert_eq!(holder, Some(me));
//! # }
//! ```
//!
//! Any store with compare-and-set style conditional writes keyed by a unique
//! group identifier and an auto-expiry mechanism can back the same contract.

pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use error::{LeaseError, LeaseResult};
pub use memory::MemoryLeaseStore;
pub use store::LeaseStore;
pub use types::{unix_now_ms, CandidateId, LeaseRecord};
