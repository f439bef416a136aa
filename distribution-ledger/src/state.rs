//! Ledger state container
//!
//! All mutable state owned by the ledger lives here: pending claims,
//! settled epochs, per-epoch totals, and the audit log. Nothing outside
//! the ledger mutates this; collaborators only see amounts passed to them.

use crate::types::{AuditEvent, AuditEventKind, EpochIndex, ProviderId};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Mutable ledger state
#[derive(Debug, Default)]
pub struct LedgerState {
    /// Accumulated balances owed but not yet paid out; zero entries absent
    pending_claims: HashMap<ProviderId, u128>,

    /// Epochs that have settled; monotone, never unset
    settled_epochs: HashSet<EpochIndex>,

    /// Total value handled per settled epoch (audit record)
    total_distributed: HashMap<EpochIndex, u128>,

    /// Counter value at the last successful distribution
    last_distribution_block: u64,

    /// Append-only audit log
    audit_log: Vec<AuditEvent>,
}

impl LedgerState {
    /// Create empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending balance for a provider (0 if absent)
    pub fn pending_claim(&self, provider: &ProviderId) -> u128 {
        self.pending_claims.get(provider).copied().unwrap_or(0)
    }

    /// Accumulate `amount` onto a provider's pending balance
    ///
    /// Returns the new balance. Checked: wrapping is reported, not silent.
    pub fn credit_pending(&mut self, provider: &ProviderId, amount: u128) -> Result<u128> {
        let current = self.pending_claim(provider);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow(format!("pending claim for {}", provider)))?;
        self.pending_claims.insert(provider.clone(), updated);
        Ok(updated)
    }

    /// Remove and return a provider's full pending balance
    pub fn take_pending(&mut self, provider: &ProviderId) -> Option<u128> {
        self.pending_claims.remove(provider)
    }

    /// Number of providers with a nonzero pending balance
    pub fn pending_provider_count(&self) -> usize {
        self.pending_claims.len()
    }

    /// Whether an epoch has settled
    pub fn is_settled(&self, epoch: EpochIndex) -> bool {
        self.settled_epochs.contains(&epoch)
    }

    /// Mark an epoch settled, exactly once
    pub fn mark_settled(&mut self, epoch: EpochIndex) -> Result<()> {
        if !self.settled_epochs.insert(epoch) {
            return Err(Error::AlreadyClaimed(epoch));
        }
        Ok(())
    }

    /// Record the total value handled for an epoch
    pub fn record_total(&mut self, epoch: EpochIndex, total: u128) {
        self.total_distributed.insert(epoch, total);
    }

    /// Total value handled for an epoch, if settled
    pub fn total_distributed(&self, epoch: EpochIndex) -> Option<u128> {
        self.total_distributed.get(&epoch).copied()
    }

    /// Counter value at the last successful distribution
    pub fn last_distribution_block(&self) -> u64 {
        self.last_distribution_block
    }

    /// Update the last-distribution counter
    pub fn set_last_distribution_block(&mut self, counter: u64) {
        self.last_distribution_block = counter;
    }

    /// Append an audit event
    pub fn record_event(&mut self, kind: AuditEventKind) {
        self.audit_log.push(AuditEvent {
            event_id: Uuid::now_v7(),
            recorded_at: Utc::now(),
            kind,
        });
    }

    /// Full audit log, oldest first
    pub fn audit_log(&self) -> &[AuditEvent] {
        &self.audit_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_accumulates() {
        let mut state = LedgerState::new();
        let provider = ProviderId::new("ST1PROV");

        assert_eq!(state.pending_claim(&provider), 0);
        assert_eq!(state.credit_pending(&provider, 40).unwrap(), 40);
        assert_eq!(state.credit_pending(&provider, 60).unwrap(), 100);
        assert_eq!(state.pending_claim(&provider), 100);
        assert_eq!(state.pending_provider_count(), 1);
    }

    #[test]
    fn test_pending_overflow_reported() {
        let mut state = LedgerState::new();
        let provider = ProviderId::new("ST1PROV");

        state.credit_pending(&provider, u128::MAX).unwrap();
        let result = state.credit_pending(&provider, 1);
        assert!(matches!(result, Err(Error::Overflow(_))));
        // Balance unchanged on failure
        assert_eq!(state.pending_claim(&provider), u128::MAX);
    }

    #[test]
    fn test_take_pending_removes_entry() {
        let mut state = LedgerState::new();
        let provider = ProviderId::new("ST1PROV");

        state.credit_pending(&provider, 200).unwrap();
        assert_eq!(state.take_pending(&provider), Some(200));
        assert_eq!(state.take_pending(&provider), None);
        assert_eq!(state.pending_claim(&provider), 0);
    }

    #[test]
    fn test_mark_settled_exactly_once() {
        let mut state = LedgerState::new();

        assert!(!state.is_settled(3));
        state.mark_settled(3).unwrap();
        assert!(state.is_settled(3));
        assert!(matches!(
            state.mark_settled(3),
            Err(Error::AlreadyClaimed(3))
        ));
        // Still settled after the duplicate attempt
        assert!(state.is_settled(3));
    }

    #[test]
    fn test_audit_log_appends() {
        let mut state = LedgerState::new();
        state.record_event(AuditEventKind::FundsDistributed {
            epoch: 0,
            total: 1000,
        });
        state.record_event(AuditEventKind::AllocationClaimed {
            provider: ProviderId::new("ST1PROV"),
            amount: 200,
        });

        let log = state.audit_log();
        assert_eq!(log.len(), 2);
        assert!(matches!(
            log[0].kind,
            AuditEventKind::FundsDistributed { epoch: 0, total: 1000 }
        ));
    }
}
