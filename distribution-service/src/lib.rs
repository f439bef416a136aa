//! Distribution Service
//!
//! Service layer around the distribution ledger core: configuration
//! loading, the epoch-advance trigger (a scheduler polling an external
//! counter source), and a facade that wires configuration, collaborators,
//! metrics, and the ledger actor together.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use scheduler::{CounterSource, DistributionScheduler};
pub use service::DistributionService;

/// Initialize tracing with an env-filter subscriber
///
/// Intended for binaries; tests install their own subscribers.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
