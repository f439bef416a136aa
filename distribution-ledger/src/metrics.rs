//! Metrics collection for observability
//!
//! Prometheus metrics for monitoring the distribution ledger.
//!
//! # Metrics
//!
//! - `distribution_passes_total` - Successful distribution passes
//! - `distribution_providers` - Histogram of providers per pass
//! - `direct_payouts_total` - Direct transfers issued
//! - `dust_credits_total` - Pending-claim credits issued
//! - `claims_total` - Successful provider claims
//! - `pending_providers` - Providers with a nonzero pending balance

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Successful distribution passes
    pub distributions_total: IntCounter,

    /// Providers per distribution pass
    pub providers_per_pass: Histogram,

    /// Direct transfers issued
    pub direct_payouts_total: IntCounter,

    /// Pending-claim credits issued
    pub dust_credits_total: IntCounter,

    /// Successful claims
    pub claims_total: IntCounter,

    /// Providers with a nonzero pending balance
    pub pending_providers: IntGauge,

    /// Prometheus registry
    registry: Arc<Registry>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector with an owned registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let distributions_total = IntCounter::with_opts(Opts::new(
            "distribution_passes_total",
            "Successful distribution passes",
        ))?;
        registry.register(Box::new(distributions_total.clone()))?;

        let providers_per_pass = Histogram::with_opts(
            HistogramOpts::new("distribution_providers", "Providers per distribution pass")
                .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
        )?;
        registry.register(Box::new(providers_per_pass.clone()))?;

        let direct_payouts_total = IntCounter::with_opts(Opts::new(
            "direct_payouts_total",
            "Direct transfers issued",
        ))?;
        registry.register(Box::new(direct_payouts_total.clone()))?;

        let dust_credits_total = IntCounter::with_opts(Opts::new(
            "dust_credits_total",
            "Pending-claim credits issued",
        ))?;
        registry.register(Box::new(dust_credits_total.clone()))?;

        let claims_total =
            IntCounter::with_opts(Opts::new("claims_total", "Successful provider claims"))?;
        registry.register(Box::new(claims_total.clone()))?;

        let pending_providers = IntGauge::with_opts(Opts::new(
            "pending_providers",
            "Providers with a nonzero pending balance",
        ))?;
        registry.register(Box::new(pending_providers.clone()))?;

        Ok(Self {
            distributions_total,
            providers_per_pass,
            direct_payouts_total,
            dust_credits_total,
            claims_total,
            pending_providers,
            registry,
        })
    }

    /// Record a completed distribution pass
    pub fn record_distribution(&self, provider_count: usize) {
        self.distributions_total.inc();
        self.providers_per_pass.observe(provider_count as f64);
    }

    /// Record a direct payout
    pub fn record_direct_payout(&self) {
        self.direct_payouts_total.inc();
    }

    /// Record a pending-claim credit
    pub fn record_dust_credit(&self) {
        self.dust_credits_total.inc();
    }

    /// Record a successful claim
    pub fn record_claim(&self) {
        self.claims_total.inc();
    }

    /// Update the pending-provider gauge
    pub fn set_pending_providers(&self, count: usize) {
        self.pending_providers.set(count as i64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.distributions_total.get(), 0);
        assert_eq!(metrics.claims_total.get(), 0);
    }

    #[test]
    fn test_record_distribution() {
        let metrics = Metrics::new().unwrap();
        metrics.record_distribution(2);
        metrics.record_distribution(500);
        assert_eq!(metrics.distributions_total.get(), 2);
    }

    #[test]
    fn test_pending_providers_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.set_pending_providers(7);
        assert_eq!(metrics.pending_providers.get(), 7);
        metrics.set_pending_providers(0);
        assert_eq!(metrics.pending_providers.get(), 0);
    }
}
