//! Distribution ledger orchestration
//!
//! This module ties the state container, epoch resolver, and collaborator
//! interfaces into the distribution/claim state machine. The type here is
//! synchronous and exclusively owns its state; the actor in [`crate::actor`]
//! wraps it to serialize concurrent callers.
//!
//! # Guard order
//!
//! `distribute_funds` evaluates its guards in a fixed order and returns the
//! first failing condition, so callers see a stable error when several
//! conditions fail at once: epoch not ready, empty allocations, paused,
//! insufficient balance, provider cap, epoch already settled.

use crate::collaborators::{AllocationSource, FundingPool};
use crate::config::Policy;
use crate::epoch;
use crate::metrics::Metrics;
use crate::state::LedgerState;
use crate::types::{AuditEvent, AuditEventKind, DistributionSummary, EpochIndex, ProviderId};
use crate::{Error, Result};

/// The distribution ledger
///
/// Owns all mutable state and the two injected collaborators. Every method
/// runs to completion before another can observe its effects (enforced by
/// `&mut self` here and by the single-writer actor in deployment).
pub struct DistributionLedger {
    /// Mutable ledger state
    state: LedgerState,

    /// Distribution policy (admin-mutable)
    policy: Policy,

    /// Produces per-epoch allocations (queried, never mutated)
    allocation_source: Box<dyn AllocationSource>,

    /// Custodies funds and executes transfers
    funding_pool: Box<dyn FundingPool>,

    /// Metrics collector (if enabled)
    metrics: Option<Metrics>,
}

impl std::fmt::Debug for DistributionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributionLedger")
            .field("state", &self.state)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl DistributionLedger {
    /// Create a new ledger with a validated policy
    pub fn new(
        policy: Policy,
        allocation_source: Box<dyn AllocationSource>,
        funding_pool: Box<dyn FundingPool>,
    ) -> Result<Self> {
        policy.validate()?;

        Ok(Self {
            state: LedgerState::new(),
            policy,
            allocation_source,
            funding_pool,
            metrics: None,
        })
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Settle the most recently completed epoch
    ///
    /// `counter` is the externally supplied block/time counter. The target
    /// epoch is the one before the current epoch; it settles exactly once.
    /// Per allocation: amounts below the minimum payout are skipped, amounts
    /// at or below the dust threshold accumulate into pending claims, and
    /// the rest transfer directly through the funding pool. A rejected
    /// direct transfer falls back to the provider's pending claims so the
    /// pass still completes and value is conserved.
    pub fn distribute_funds(&mut self, counter: u64) -> Result<DistributionSummary> {
        let current = epoch::current_epoch(counter, self.policy.distribution_frequency)?;
        if current == 0 {
            // No epoch has completed yet
            return Err(Error::EpochNotReady(current));
        }
        let prev_epoch = current - 1;

        let allocs = self.allocation_source.compute_allocations(prev_epoch)?;
        if allocs.is_empty() {
            return Err(Error::NoAllocations(prev_epoch));
        }

        let pool_balance = self.funding_pool.available_balance()?;

        if self.policy.distribution_paused {
            return Err(Error::DistributionPaused);
        }

        let mut total: u128 = 0;
        for alloc in &allocs {
            total = total
                .checked_add(alloc.amount)
                .ok_or_else(|| Error::Overflow("allocation sum".to_string()))?;
        }

        if total > pool_balance {
            return Err(Error::InsufficientBalance {
                required: total,
                available: pool_balance,
            });
        }

        if allocs.len() > self.policy.max_providers {
            return Err(Error::MaxProvidersExceeded {
                count: allocs.len(),
                max: self.policy.max_providers,
            });
        }

        if self.state.is_settled(prev_epoch) {
            return Err(Error::AlreadyClaimed(prev_epoch));
        }

        let mut paid_direct: u128 = 0;
        let mut credited_pending: u128 = 0;
        let mut skipped: u128 = 0;

        for alloc in &allocs {
            if alloc.amount < self.policy.min_payout {
                skipped += alloc.amount;
                continue;
            }

            if alloc.amount <= self.policy.dust_threshold {
                self.state.credit_pending(&alloc.provider, alloc.amount)?;
                credited_pending += alloc.amount;
                if let Some(metrics) = &self.metrics {
                    metrics.record_dust_credit();
                }
                continue;
            }

            match self.funding_pool.transfer_funds(&alloc.provider, alloc.amount) {
                Ok(()) => {
                    paid_direct += alloc.amount;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_direct_payout();
                    }
                }
                Err(err) => {
                    // Rejected transfers become claimable instead of
                    // aborting the pass; the epoch still settles once.
                    tracing::warn!(
                        provider = %alloc.provider,
                        amount = %alloc.amount,
                        error = %err,
                        "direct transfer rejected, crediting pending claims"
                    );
                    self.state.credit_pending(&alloc.provider, alloc.amount)?;
                    credited_pending += alloc.amount;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_dust_credit();
                    }
                }
            }
        }

        self.state.mark_settled(prev_epoch)?;
        self.state.record_total(prev_epoch, total);
        self.state.set_last_distribution_block(counter);
        self.state.record_event(AuditEventKind::FundsDistributed {
            epoch: prev_epoch,
            total,
        });

        if let Some(metrics) = &self.metrics {
            metrics.record_distribution(allocs.len());
            metrics.set_pending_providers(self.state.pending_provider_count());
        }

        tracing::info!(
            epoch = prev_epoch,
            total = %total,
            paid_direct = %paid_direct,
            credited_pending = %credited_pending,
            skipped = %skipped,
            "funds distributed"
        );

        Ok(DistributionSummary {
            epoch: prev_epoch,
            total,
            paid_direct,
            credited_pending,
            skipped,
            provider_count: allocs.len(),
        })
    }

    /// Withdraw the caller's full pending balance
    ///
    /// All-or-nothing: the entire balance transfers and the entry is
    /// removed. A rejected transfer leaves the balance intact.
    pub fn claim_allocation(&mut self, caller: &ProviderId) -> Result<u128> {
        let pending = self.state.pending_claim(caller);
        if pending == 0 {
            return Err(Error::InvalidAmount);
        }

        self.funding_pool.transfer_funds(caller, pending)?;
        self.state.take_pending(caller);
        self.state.record_event(AuditEventKind::AllocationClaimed {
            provider: caller.clone(),
            amount: pending,
        });

        if let Some(metrics) = &self.metrics {
            metrics.record_claim();
            metrics.set_pending_providers(self.state.pending_provider_count());
        }

        tracing::info!(provider = %caller, amount = %pending, "allocation claimed");

        Ok(pending)
    }

    /// Set the minimum payout (admin only)
    pub fn set_min_payout(&mut self, caller: &ProviderId, min_payout: u128) -> Result<()> {
        self.ensure_admin(caller)?;
        if min_payout == 0 {
            return Err(Error::InvalidAmount);
        }
        self.policy.min_payout = min_payout;
        tracing::info!(min_payout = %min_payout, "minimum payout updated");
        Ok(())
    }

    /// Set the dust threshold (admin only)
    pub fn set_dust_threshold(&mut self, caller: &ProviderId, dust_threshold: u128) -> Result<()> {
        self.ensure_admin(caller)?;
        if dust_threshold >= self.policy.min_payout {
            tracing::warn!(
                dust_threshold = %dust_threshold,
                min_payout = %self.policy.min_payout,
                "dust threshold at or above minimum payout: payable amounts up to the threshold will be queued"
            );
        }
        self.policy.dust_threshold = dust_threshold;
        tracing::info!(dust_threshold = %dust_threshold, "dust threshold updated");
        Ok(())
    }

    /// Set the per-epoch provider cap (admin only)
    pub fn set_max_providers(&mut self, caller: &ProviderId, max_providers: usize) -> Result<()> {
        self.ensure_admin(caller)?;
        if max_providers == 0 {
            return Err(Error::InvalidParam(
                "max providers must be positive".to_string(),
            ));
        }
        self.policy.max_providers = max_providers;
        tracing::info!(max_providers, "max providers updated");
        Ok(())
    }

    /// Set the distribution frequency (admin only)
    pub fn set_distribution_frequency(&mut self, caller: &ProviderId, frequency: u64) -> Result<()> {
        self.ensure_admin(caller)?;
        if frequency == 0 {
            return Err(Error::InvalidDistributionFrequency(
                "must be positive".to_string(),
            ));
        }
        self.policy.distribution_frequency = frequency;
        tracing::info!(frequency, "distribution frequency updated");
        Ok(())
    }

    /// Pause or resume distribution (admin only)
    pub fn pause_distribution(&mut self, caller: &ProviderId, paused: bool) -> Result<()> {
        self.ensure_admin(caller)?;
        self.policy.distribution_paused = paused;
        tracing::info!(paused, "distribution pause flag updated");
        Ok(())
    }

    /// Pending balance for a provider (0 if absent)
    pub fn pending_claim(&self, provider: &ProviderId) -> u128 {
        self.state.pending_claim(provider)
    }

    /// Whether an epoch has settled
    pub fn is_epoch_settled(&self, epoch: EpochIndex) -> bool {
        self.state.is_settled(epoch)
    }

    /// Total value handled for a settled epoch
    pub fn total_distributed(&self, epoch: EpochIndex) -> Option<u128> {
        self.state.total_distributed(epoch)
    }

    /// Counter value at the last successful distribution
    pub fn last_distribution_block(&self) -> u64 {
        self.state.last_distribution_block()
    }

    /// Current policy
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Audit log, oldest first
    pub fn audit_log(&self) -> &[AuditEvent] {
        self.state.audit_log()
    }

    fn ensure_admin(&self, caller: &ProviderId) -> Result<()> {
        if caller != &self.policy.admin {
            return Err(Error::NotAuthorized(caller.clone()));
        }
        Ok(())
    }
}
