//! Epoch resolution
//!
//! An epoch is a fixed-length window of the external block/time counter.
//! The counter starts at 1; epoch `e` is complete once the counter has
//! advanced into epoch `e + 1`.

use crate::{Error, Result};
use crate::types::EpochIndex;

/// Resolve the current epoch from the external counter
///
/// `floor((counter - 1) / frequency)`. Pure function, no side effects.
/// A zero frequency or a zero counter is a caller error and is rejected
/// explicitly rather than left undefined.
pub fn current_epoch(counter: u64, frequency: u64) -> Result<EpochIndex> {
    if frequency == 0 {
        return Err(Error::DivisionByZero(
            "distribution frequency is zero".to_string(),
        ));
    }
    if counter == 0 {
        return Err(Error::InvalidParam("counter starts at 1".to_string()));
    }
    Ok((counter - 1) / frequency)
}
