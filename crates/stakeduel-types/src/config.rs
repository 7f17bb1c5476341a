//! Engine configuration: commission, penalties, bonuses, stake limits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants, Result, StakeduelError};

/// Financial parameters of the wagering engine.
///
/// All rates and fees are fixed at engine construction; there is no
/// per-battle override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Platform cut of the combined pot on a completed battle,
    /// as a fraction in `[0, 1)` (e.g. 0.05).
    pub commission_rate: Decimal,
    /// Flat penalty charged to the cancelling party when an opponent has
    /// already joined. Transferred to the other party, not to the platform.
    pub cancellation_penalty: Decimal,
    /// One-time bonus credited to a referrer on the referred user's first
    /// completed game.
    pub referral_bonus: Decimal,
    /// Minimum stake per player.
    pub min_stake: Decimal,
}

impl EngineConfig {
    /// Validate that the parameters are internally coherent.
    ///
    /// # Errors
    /// Returns [`StakeduelError::Configuration`] on any out-of-range value.
    pub fn validate(&self) -> Result<()> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(StakeduelError::Configuration(format!(
                "commission_rate must be in [0, 1), got {}",
                self.commission_rate
            )));
        }
        if self.cancellation_penalty < Decimal::ZERO {
            return Err(StakeduelError::Configuration(
                "cancellation_penalty must be >= 0".into(),
            ));
        }
        if self.referral_bonus < Decimal::ZERO {
            return Err(StakeduelError::Configuration(
                "referral_bonus must be >= 0".into(),
            ));
        }
        if self.min_stake <= Decimal::ZERO {
            return Err(StakeduelError::Configuration(
                "min_stake must be > 0".into(),
            ));
        }
        // The canceller's refund (amount - penalty) must never go negative
        // for any legal stake.
        if self.cancellation_penalty > self.min_stake {
            return Err(StakeduelError::Configuration(format!(
                "cancellation_penalty {} exceeds min_stake {}",
                self.cancellation_penalty, self.min_stake
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commission_rate: Decimal::new(constants::DEFAULT_COMMISSION_RATE_BPS.into(), 4),
            cancellation_penalty: Decimal::from(constants::DEFAULT_CANCELLATION_PENALTY),
            referral_bonus: Decimal::from(constants::DEFAULT_REFERRAL_BONUS),
            min_stake: Decimal::from(constants::DEFAULT_MIN_STAKE),
        }
    }
}
