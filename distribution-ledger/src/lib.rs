//! Distribution Ledger Core
//!
//! Epoch-based fund distribution: each completed epoch, a set of
//! (provider, amount) allocations is pulled from an external allocation
//! source and settled against a funding pool. Large amounts are paid out
//! directly; dust amounts accumulate into per-provider pending claims that
//! providers withdraw later.
//!
//! # Architecture
//!
//! - **Single Writer**: All state lives behind one actor task; every
//!   operation executes atomically with respect to all others
//! - **Capability Interfaces**: The allocation source and funding pool are
//!   injected as traits, so collaborators are swappable in tests
//! - **Exactly Once**: Each epoch settles at most once, guarded by a
//!   monotone settled-epoch set
//!
//! # Invariants
//!
//! - Conservation: direct payouts + pending credits + skipped dust ==
//!   recorded epoch total
//! - Settled epochs are never unsettled; pending claims never go negative
//! - Admin-only configuration is mutated only by the admin identity
//! - Checked arithmetic everywhere amounts are summed or accumulated

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod collaborators;
pub mod config;
pub mod epoch;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use collaborators::{AllocationSource, FundingPool};
pub use config::Policy;
pub use error::{Error, Result};
pub use ledger::DistributionLedger;
pub use metrics::Metrics;
pub use types::{
    Allocation, AuditEvent, AuditEventKind, DistributionSummary, EpochIndex, ProviderId,
};
