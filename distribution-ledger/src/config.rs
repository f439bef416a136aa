//! Distribution policy configuration

use crate::types::ProviderId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Distribution policy
///
/// Mutable at runtime only through the admin operations on the ledger,
/// which re-validate the affected field before assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum amount eligible for any payout
    pub min_payout: u128,

    /// Amounts at or below this are queued as pending claims instead of
    /// transferred directly
    pub dust_threshold: u128,

    /// Cap on allocations processed per epoch
    pub max_providers: usize,

    /// Counter units per epoch
    pub distribution_frequency: u64,

    /// Gates all distribution when set
    pub distribution_paused: bool,

    /// Identity authorized for configuration changes
    pub admin: ProviderId,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            min_payout: 100,
            dust_threshold: 10,
            max_providers: 500,
            distribution_frequency: 144,
            distribution_paused: false,
            admin: ProviderId::new("admin"),
        }
    }
}

impl Policy {
    /// Validate the policy invariants
    ///
    /// Positivity of min payout, provider cap, and frequency are hard
    /// requirements. The dust threshold may sit on either side of the
    /// minimum payout: below it the dust band is empty (nothing is ever
    /// queued from allocations), at or above it the band
    /// `[min_payout, dust_threshold]` is queued instead of transferred.
    /// Whichever regime is active gets logged so the choice is explicit.
    pub fn validate(&self) -> Result<()> {
        if self.min_payout == 0 {
            return Err(Error::InvalidMinPayout("must be positive".to_string()));
        }
        if self.max_providers == 0 {
            return Err(Error::InvalidParam(
                "max providers must be positive".to_string(),
            ));
        }
        if self.distribution_frequency == 0 {
            return Err(Error::InvalidDistributionFrequency(
                "must be positive".to_string(),
            ));
        }

        if self.dust_threshold >= self.min_payout {
            tracing::warn!(
                min_payout = %self.min_payout,
                dust_threshold = %self.dust_threshold,
                "dust band active: amounts in [min_payout, dust_threshold] are queued, not transferred"
            );
        } else {
            tracing::debug!(
                min_payout = %self.min_payout,
                dust_threshold = %self.dust_threshold,
                "dust band empty: all payable amounts are transferred directly"
            );
        }

        Ok(())
    }
}
