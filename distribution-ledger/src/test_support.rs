//! In-memory fakes for the collaborator interfaces, shared across unit tests

use crate::collaborators::{AllocationSource, FundingPool};
use crate::types::{Allocation, EpochIndex, ProviderId};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Shared record of transfers issued through a [`RecordingPool`]
pub type TransferLog = Arc<Mutex<Vec<(ProviderId, u128)>>>;

/// Allocation source backed by a per-epoch map
#[derive(Debug, Default)]
pub struct FakeAllocationSource {
    by_epoch: HashMap<EpochIndex, Vec<Allocation>>,
}

impl FakeAllocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_allocations(&mut self, epoch: EpochIndex, allocs: Vec<Allocation>) {
        self.by_epoch.insert(epoch, allocs);
    }
}

impl AllocationSource for FakeAllocationSource {
    fn compute_allocations(&self, epoch: EpochIndex) -> Result<Vec<Allocation>> {
        Ok(self.by_epoch.get(&epoch).cloned().unwrap_or_default())
    }
}

/// Funding pool that records transfers and can reject named recipients
#[derive(Debug)]
pub struct RecordingPool {
    balance: u128,
    transfers: TransferLog,
    reject: HashSet<ProviderId>,
}

impl RecordingPool {
    pub fn new(balance: u128) -> Self {
        Self {
            balance,
            transfers: Arc::new(Mutex::new(Vec::new())),
            reject: HashSet::new(),
        }
    }

    /// Handle for inspecting transfers after the pool is moved into a ledger
    pub fn transfer_log(&self) -> TransferLog {
        Arc::clone(&self.transfers)
    }

    /// Reject every transfer to the named provider
    pub fn fail_transfers_to(&mut self, provider: impl Into<String>) {
        self.reject.insert(ProviderId::new(provider));
    }
}

impl FundingPool for RecordingPool {
    fn available_balance(&self) -> Result<u128> {
        Ok(self.balance)
    }

    fn transfer_funds(&mut self, to: &ProviderId, amount: u128) -> Result<()> {
        if self.reject.contains(to) {
            return Err(Error::InvalidStatus(format!(
                "pool rejected transfer to {}",
                to
            )));
        }
        self.transfers
            .lock()
            .expect("transfer log poisoned")
            .push((to.clone(), amount));
        Ok(())
    }
}
