//! Core types for the distribution ledger
//!
//! Amounts are unsigned 128-bit integers. They arrive from external
//! collaborators, so every sum and accumulation over them is checked and
//! surfaces overflow as an error instead of wrapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Epoch index, derived from the external counter
pub type EpochIndex = u64;

/// Provider identity (also used for admin and operation callers)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create new provider ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One provider's share of an epoch's distribution
///
/// Ephemeral: produced per epoch by the allocation source and not retained
/// by the ledger beyond the processing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Recipient provider
    pub provider: ProviderId,

    /// Allocated amount
    pub amount: u128,
}

impl Allocation {
    /// Create new allocation
    pub fn new(provider: impl Into<String>, amount: u128) -> Self {
        Self {
            provider: ProviderId::new(provider),
            amount,
        }
    }
}

/// Audit event recorded for every externally visible state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// When the event was recorded
    pub recorded_at: DateTime<Utc>,

    /// What happened
    pub kind: AuditEventKind,
}

/// Kinds of audit events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventKind {
    /// An epoch's allocations were settled
    FundsDistributed {
        /// Settled epoch
        epoch: EpochIndex,
        /// Sum of all allocation amounts handled in the pass
        total: u128,
    },

    /// A provider withdrew their full pending balance
    AllocationClaimed {
        /// Claiming provider
        provider: ProviderId,
        /// Amount transferred
        amount: u128,
    },
}

/// Outcome of a successful distribution pass
///
/// Conservation holds per pass:
/// `paid_direct + credited_pending + skipped == total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Epoch that was settled
    pub epoch: EpochIndex,

    /// Sum of all allocation amounts
    pub total: u128,

    /// Value transferred directly through the funding pool
    pub paid_direct: u128,

    /// Value accumulated into pending claims
    pub credited_pending: u128,

    /// Value skipped for being below the minimum payout
    pub skipped: u128,

    /// Number of allocations processed
    pub provider_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_display() {
        let provider = ProviderId::new("ST1PROV");
        assert_eq!(provider.as_str(), "ST1PROV");
        assert_eq!(provider.to_string(), "ST1PROV");
    }

    #[test]
    fn test_allocation_new() {
        let alloc = Allocation::new("ST1PROV", 500);
        assert_eq!(alloc.provider, ProviderId::new("ST1PROV"));
        assert_eq!(alloc.amount, 500);
    }

    #[test]
    fn test_summary_conservation() {
        let summary = DistributionSummary {
            epoch: 0,
            total: 1000,
            paid_direct: 700,
            credited_pending: 250,
            skipped: 50,
            provider_count: 3,
        };
        assert_eq!(
            summary.paid_direct + summary.credited_pending + summary.skipped,
            summary.total
        );
    }
}
