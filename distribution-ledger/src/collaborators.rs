//! External collaborator interfaces
//!
//! The allocation source and funding pool are leaf dependencies invoked
//! through these narrow traits. Both are treated as synchronous: a call
//! either returns a value or fails immediately. Retry and backoff, where
//! needed, belong to the collaborator's own contract, not the ledger.

use crate::types::{Allocation, EpochIndex, ProviderId};
use crate::Result;

/// Produces the allocation list for a completed epoch
///
/// Must be deterministic for a given epoch once that epoch has elapsed.
/// An empty list is valid and fails the distribution pass.
pub trait AllocationSource: Send {
    /// Compute the allocations for `epoch`
    fn compute_allocations(&self, epoch: EpochIndex) -> Result<Vec<Allocation>>;
}

/// Holds custody of funds and executes transfers
///
/// The ledger guards the aggregate balance before issuing any transfer but
/// does not re-check per transfer.
pub trait FundingPool: Send {
    /// Current spendable balance
    fn available_balance(&self) -> Result<u128>;

    /// Transfer `amount` to `to`
    fn transfer_funds(&mut self, to: &ProviderId, amount: u128) -> Result<()>;
}
