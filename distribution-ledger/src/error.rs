//! Error types for the distribution ledger

use crate::types::ProviderId;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every operation returns one of these; no operation panics or aborts.
/// Guard failures in distribution are surfaced verbatim to the caller in a
/// fixed precedence order, so callers can rely on which error they see when
/// several conditions fail at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Caller is not the configured admin
    #[error("caller {0} is not authorized")]
    NotAuthorized(ProviderId),

    /// Epoch index is not valid for the requested operation
    #[error("invalid epoch {0}")]
    InvalidEpoch(u64),

    /// Allocation source returned no allocations for the epoch
    #[error("no allocations for epoch {0}")]
    NoAllocations(u64),

    /// Funding pool balance cannot cover the allocation total
    #[error("insufficient pool balance: need {required}, have {available}")]
    InsufficientBalance {
        /// Sum of all allocation amounts for the epoch
        required: u128,
        /// Spendable balance reported by the funding pool
        available: u128,
    },

    /// Distribution is administratively paused
    #[error("distribution is paused")]
    DistributionPaused,

    /// Provider identity is not acceptable
    #[error("invalid provider: {0}")]
    InvalidProvider(String),

    /// Epoch has already been settled (re-entrancy guard)
    #[error("epoch {0} already settled")]
    AlreadyClaimed(u64),

    /// Provider has no pending claim balance
    #[error("no pending claim for provider {0}")]
    NoPending(ProviderId),

    /// Amount is zero or otherwise not payable
    #[error("invalid amount")]
    InvalidAmount,

    /// The target epoch has not elapsed yet
    #[error("epoch not ready: epoch {0} has not completed")]
    EpochNotReady(u64),

    /// Allocation count exceeds the per-epoch provider cap
    #[error("allocation count {count} exceeds max providers {max}")]
    MaxProvidersExceeded {
        /// Number of allocations returned for the epoch
        count: usize,
        /// Configured cap
        max: usize,
    },

    /// Minimum payout value rejected
    #[error("invalid minimum payout: {0}")]
    InvalidMinPayout(String),

    /// Distribution frequency value rejected
    #[error("invalid distribution frequency: {0}")]
    InvalidDistributionFrequency(String),

    /// Dust threshold value rejected
    #[error("invalid dust threshold: {0}")]
    InvalidDustThreshold(String),

    /// A required collaborator is not wired in
    #[error("collaborator not set: {0}")]
    ContractNotSet(String),

    /// Operation is not valid in the current state
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Arithmetic overflow on amounts
    #[error("arithmetic overflow in {0}")]
    Overflow(String),

    /// Arithmetic underflow on amounts
    #[error("arithmetic underflow in {0}")]
    Underflow(String),

    /// Division by zero (misconfigured frequency)
    #[error("division by zero: {0}")]
    DivisionByZero(String),

    /// Generic parameter validation failure
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Pause state change rejected
    #[error("pause not allowed: {0}")]
    PauseNotAllowed(String),
}
