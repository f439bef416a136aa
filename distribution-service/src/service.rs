//! Service facade
//!
//! Wires configuration, the injected collaborators, metrics, and the ledger
//! actor together into one deployable unit.

use crate::config::Config;
use crate::scheduler::{CounterSource, DistributionScheduler};
use crate::Result;
use distribution_ledger::{
    spawn_ledger_actor, AllocationSource, DistributionLedger, FundingPool, LedgerHandle, Metrics,
};
use std::sync::Arc;
use std::time::Duration;

/// Distribution service
pub struct DistributionService {
    /// Handle to the ledger actor
    handle: LedgerHandle,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl std::fmt::Debug for DistributionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributionService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DistributionService {
    /// Create the service and spawn the ledger actor
    pub fn new(
        config: Config,
        allocation_source: Box<dyn AllocationSource>,
        funding_pool: Box<dyn FundingPool>,
    ) -> Result<Self> {
        let metrics = Metrics::new()?;

        let ledger =
            DistributionLedger::new(config.policy.clone(), allocation_source, funding_pool)?
                .with_metrics(metrics.clone());
        let handle = spawn_ledger_actor(ledger);

        tracing::info!(
            service = %config.service_name,
            version = %config.service_version,
            "distribution service started"
        );

        Ok(Self {
            handle,
            metrics,
            config,
        })
    }

    /// Handle to the ledger actor
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Build the epoch-advance scheduler for this service
    pub fn scheduler(&self, counter_source: Arc<dyn CounterSource>) -> DistributionScheduler {
        DistributionScheduler::new(
            self.handle.clone(),
            counter_source,
            Duration::from_millis(self.config.poll_interval_ms),
        )
    }

    /// Shutdown the ledger actor
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        tracing::info!("distribution service stopped");
        Ok(())
    }
}
