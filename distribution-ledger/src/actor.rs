//! Actor-based serialization for the ledger
//!
//! The ledger is a single serialized state machine: every operation must
//! execute to completion before the next observes any state. This module
//! enforces that with the single-writer pattern: one Tokio task owns the
//! [`DistributionLedger`], callers hold a cloneable [`LedgerHandle`] and
//! exchange messages over a bounded mailbox with oneshot responses.

use crate::config::Policy;
use crate::ledger::DistributionLedger;
use crate::types::{AuditEvent, DistributionSummary, EpochIndex, ProviderId};
use crate::{Error, Result};
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Settle the most recently completed epoch
    DistributeFunds {
        /// External block/time counter at trigger time
        counter: u64,
        /// Response channel
        response: oneshot::Sender<Result<DistributionSummary>>,
    },

    /// Withdraw the caller's full pending balance
    ClaimAllocation {
        /// Claiming provider
        caller: ProviderId,
        /// Response channel
        response: oneshot::Sender<Result<u128>>,
    },

    /// Set the minimum payout
    SetMinPayout {
        /// Operation caller
        caller: ProviderId,
        /// New minimum payout
        min_payout: u128,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Set the dust threshold
    SetDustThreshold {
        /// Operation caller
        caller: ProviderId,
        /// New dust threshold
        dust_threshold: u128,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Set the per-epoch provider cap
    SetMaxProviders {
        /// Operation caller
        caller: ProviderId,
        /// New provider cap
        max_providers: usize,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Set the distribution frequency
    SetDistributionFrequency {
        /// Operation caller
        caller: ProviderId,
        /// New frequency (counter units per epoch)
        frequency: u64,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Pause or resume distribution
    PauseDistribution {
        /// Operation caller
        caller: ProviderId,
        /// New pause flag
        paused: bool,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Read a provider's pending balance
    GetPendingClaim {
        /// Provider to look up
        provider: ProviderId,
        /// Response channel
        response: oneshot::Sender<u128>,
    },

    /// Read whether an epoch has settled
    IsEpochSettled {
        /// Epoch to look up
        epoch: EpochIndex,
        /// Response channel
        response: oneshot::Sender<bool>,
    },

    /// Read the total distributed for an epoch
    GetTotalDistributed {
        /// Epoch to look up
        epoch: EpochIndex,
        /// Response channel
        response: oneshot::Sender<Option<u128>>,
    },

    /// Read the counter at the last successful distribution
    GetLastDistributionBlock {
        /// Response channel
        response: oneshot::Sender<u64>,
    },

    /// Read the current policy
    GetPolicy {
        /// Response channel
        response: oneshot::Sender<Policy>,
    },

    /// Read the audit log
    GetAuditLog {
        /// Response channel
        response: oneshot::Sender<Vec<AuditEvent>>,
    },

    /// Shutdown actor
    Shutdown,
}

impl std::fmt::Debug for LedgerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LedgerMessage::DistributeFunds { .. } => "DistributeFunds",
            LedgerMessage::ClaimAllocation { .. } => "ClaimAllocation",
            LedgerMessage::SetMinPayout { .. } => "SetMinPayout",
            LedgerMessage::SetDustThreshold { .. } => "SetDustThreshold",
            LedgerMessage::SetMaxProviders { .. } => "SetMaxProviders",
            LedgerMessage::SetDistributionFrequency { .. } => "SetDistributionFrequency",
            LedgerMessage::PauseDistribution { .. } => "PauseDistribution",
            LedgerMessage::GetPendingClaim { .. } => "GetPendingClaim",
            LedgerMessage::IsEpochSettled { .. } => "IsEpochSettled",
            LedgerMessage::GetTotalDistributed { .. } => "GetTotalDistributed",
            LedgerMessage::GetLastDistributionBlock { .. } => "GetLastDistributionBlock",
            LedgerMessage::GetPolicy { .. } => "GetPolicy",
            LedgerMessage::GetAuditLog { .. } => "GetAuditLog",
            LedgerMessage::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

/// Actor that owns the ledger and processes messages one at a time
#[derive(Debug)]
pub struct LedgerActor {
    /// The ledger state machine
    ledger: DistributionLedger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: DistributionLedger, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { ledger, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, LedgerMessage::Shutdown) {
                break;
            }
            self.handle_message(msg);
        }
        tracing::debug!("ledger actor stopped");
    }

    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::DistributeFunds { counter, response } => {
                let _ = response.send(self.ledger.distribute_funds(counter));
            }
            LedgerMessage::ClaimAllocation { caller, response } => {
                let _ = response.send(self.ledger.claim_allocation(&caller));
            }
            LedgerMessage::SetMinPayout {
                caller,
                min_payout,
                response,
            } => {
                let _ = response.send(self.ledger.set_min_payout(&caller, min_payout));
            }
            LedgerMessage::SetDustThreshold {
                caller,
                dust_threshold,
                response,
            } => {
                let _ = response.send(self.ledger.set_dust_threshold(&caller, dust_threshold));
            }
            LedgerMessage::SetMaxProviders {
                caller,
                max_providers,
                response,
            } => {
                let _ = response.send(self.ledger.set_max_providers(&caller, max_providers));
            }
            LedgerMessage::SetDistributionFrequency {
                caller,
                frequency,
                response,
            } => {
                let _ = response.send(self.ledger.set_distribution_frequency(&caller, frequency));
            }
            LedgerMessage::PauseDistribution {
                caller,
                paused,
                response,
            } => {
                let _ = response.send(self.ledger.pause_distribution(&caller, paused));
            }
            LedgerMessage::GetPendingClaim { provider, response } => {
                let _ = response.send(self.ledger.pending_claim(&provider));
            }
            LedgerMessage::IsEpochSettled { epoch, response } => {
                let _ = response.send(self.ledger.is_epoch_settled(epoch));
            }
            LedgerMessage::GetTotalDistributed { epoch, response } => {
                let _ = response.send(self.ledger.total_distributed(epoch));
            }
            LedgerMessage::GetLastDistributionBlock { response } => {
                let _ = response.send(self.ledger.last_distribution_block());
            }
            LedgerMessage::GetPolicy { response } => {
                let _ = response.send(self.ledger.policy().clone());
            }
            LedgerMessage::GetAuditLog { response } => {
                let _ = response.send(self.ledger.audit_log().to_vec());
            }
            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        msg: LedgerMessage,
        rx: oneshot::Receiver<T>,
    ) -> Result<T> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::InvalidStatus("ledger actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::InvalidStatus("ledger actor dropped response".to_string()))
    }

    /// Settle the most recently completed epoch
    pub async fn distribute_funds(&self, counter: u64) -> Result<DistributionSummary> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::DistributeFunds {
                counter,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Withdraw the caller's full pending balance
    pub async fn claim_allocation(&self, caller: ProviderId) -> Result<u128> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::ClaimAllocation {
                caller,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Set the minimum payout (admin only)
    pub async fn set_min_payout(&self, caller: ProviderId, min_payout: u128) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::SetMinPayout {
                caller,
                min_payout,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Set the dust threshold (admin only)
    pub async fn set_dust_threshold(&self, caller: ProviderId, dust_threshold: u128) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::SetDustThreshold {
                caller,
                dust_threshold,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Set the per-epoch provider cap (admin only)
    pub async fn set_max_providers(&self, caller: ProviderId, max_providers: usize) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::SetMaxProviders {
                caller,
                max_providers,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Set the distribution frequency (admin only)
    pub async fn set_distribution_frequency(
        &self,
        caller: ProviderId,
        frequency: u64,
    ) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::SetDistributionFrequency {
                caller,
                frequency,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Pause or resume distribution (admin only)
    pub async fn pause_distribution(&self, caller: ProviderId, paused: bool) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::PauseDistribution {
                caller,
                paused,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Pending balance for a provider (0 if absent)
    pub async fn pending_claim(&self, provider: ProviderId) -> Result<u128> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::GetPendingClaim {
                provider,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Whether an epoch has settled
    pub async fn is_epoch_settled(&self, epoch: EpochIndex) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(LedgerMessage::IsEpochSettled { epoch, response: tx }, rx)
            .await
    }

    /// Total value handled for a settled epoch
    pub async fn total_distributed(&self, epoch: EpochIndex) -> Result<Option<u128>> {
        let (tx, rx) = oneshot::channel();
        self.request(
            LedgerMessage::GetTotalDistributed { epoch, response: tx },
            rx,
        )
        .await
    }

    /// Counter value at the last successful distribution
    pub async fn last_distribution_block(&self) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.request(LedgerMessage::GetLastDistributionBlock { response: tx }, rx)
            .await
    }

    /// Current policy
    pub async fn policy(&self) -> Result<Policy> {
        let (tx, rx) = oneshot::channel();
        self.request(LedgerMessage::GetPolicy { response: tx }, rx)
            .await
    }

    /// Audit log, oldest first
    pub async fn audit_log(&self) -> Result<Vec<AuditEvent>> {
        let (tx, rx) = oneshot::channel();
        self.request(LedgerMessage::GetAuditLog { response: tx }, rx)
            .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::InvalidStatus("ledger actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(ledger: DistributionLedger) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(256); // Bounded channel for backpressure
    let actor = LedgerActor::new(ledger, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAllocationSource, RecordingPool};
    use crate::types::Allocation;

    fn spawn_test_ledger(balance: u128) -> LedgerHandle {
        let mut source = FakeAllocationSource::new();
        source.set_allocations(
            0,
            vec![
                Allocation::new("ST1PROV", 500),
                Allocation::new("ST2PROV", 500),
            ],
        );
        let pool = RecordingPool::new(balance);
        let policy = Policy {
            admin: ProviderId::new("ST1ADMIN"),
            ..Policy::default()
        };
        let ledger = DistributionLedger::new(policy, Box::new(source), Box::new(pool)).unwrap();
        spawn_ledger_actor(ledger)
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let handle = spawn_test_ledger(1_000_000);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_distribute_and_read_through_handle() {
        let handle = spawn_test_ledger(1_000_000);

        let summary = handle.distribute_funds(145).await.unwrap();
        assert_eq!(summary.epoch, 0);
        assert_eq!(summary.total, 1000);

        assert!(handle.is_epoch_settled(0).await.unwrap());
        assert_eq!(handle.total_distributed(0).await.unwrap(), Some(1000));
        assert_eq!(handle.last_distribution_block().await.unwrap(), 145);

        let events = handle.audit_log().await.unwrap();
        assert_eq!(events.len(), 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_distribution_through_handle() {
        let handle = spawn_test_ledger(1_000_000);

        handle.distribute_funds(145).await.unwrap();
        let result = handle.distribute_funds(146).await;
        assert!(matches!(result, Err(Error::AlreadyClaimed(0))));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_operations_through_handle() {
        let handle = spawn_test_ledger(1_000_000);
        let admin = ProviderId::new("ST1ADMIN");

        handle.set_min_payout(admin.clone(), 250).await.unwrap();
        assert_eq!(handle.policy().await.unwrap().min_payout, 250);

        let result = handle
            .set_min_payout(ProviderId::new("ST2FAKE"), 999)
            .await;
        assert!(matches!(result, Err(Error::NotAuthorized(_))));
        assert_eq!(handle.policy().await.unwrap().min_payout, 250);

        handle.pause_distribution(admin, true).await.unwrap();
        let result = handle.distribute_funds(145).await;
        assert!(matches!(result, Err(Error::DistributionPaused)));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_claim_through_handle() {
        let mut source = FakeAllocationSource::new();
        source.set_allocations(0, vec![Allocation::new("ST1PROV", 30)]);
        let pool = RecordingPool::new(1_000_000);
        let policy = Policy {
            min_payout: 10,
            dust_threshold: 50,
            admin: ProviderId::new("ST1ADMIN"),
            ..Policy::default()
        };
        let ledger = DistributionLedger::new(policy, Box::new(source), Box::new(pool)).unwrap();
        let handle = spawn_ledger_actor(ledger);

        handle.distribute_funds(145).await.unwrap();
        let provider = ProviderId::new("ST1PROV");
        assert_eq!(handle.pending_claim(provider.clone()).await.unwrap(), 30);

        let claimed = handle.claim_allocation(provider.clone()).await.unwrap();
        assert_eq!(claimed, 30);
        assert_eq!(handle.pending_claim(provider.clone()).await.unwrap(), 0);

        let result = handle.claim_allocation(provider).await;
        assert!(matches!(result, Err(Error::InvalidAmount)));

        handle.shutdown().await.unwrap();
    }
}
