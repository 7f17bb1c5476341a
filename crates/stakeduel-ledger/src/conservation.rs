//! Float conservation invariant checker.
//!
//! Mathematical invariant enforced after every terminal event:
//! ```text
//! Σ(deposit_balance + winnings_balance)
//!     == Σ(verified deposits) + Σ(referral bonuses)
//!      - Σ(withdrawal reservations) - Σ(commission)
//! ```
//!
//! Stakes and refunds move money between a battle's escrow and the two
//! accounts; penalties move money between the two accounts. Neither changes
//! the total, so only four flows appear above. If this invariant ever
//! breaks, something has gone catastrophically wrong.

use rust_decimal::Decimal;
use stakeduel_types::{Result, StakeduelError};

use crate::WalletLedger;

/// Tracks the expected user float and validates it against the ledger.
pub struct FloatConservation {
    /// Total verified deposits since genesis.
    deposits: Decimal,
    /// Total referral bonuses paid since genesis.
    bonuses: Decimal,
    /// Total withdrawal reservations since genesis (reserved at request
    /// time; a rejected withdrawal is recorded as a negative reservation).
    withdrawals: Decimal,
    /// Total commission taken since genesis.
    commission: Decimal,
    /// Stakes currently held in battle escrow (debited from accounts,
    /// not yet released by a terminal event).
    in_escrow: Decimal,
}

impl FloatConservation {
    /// Create a fresh tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            deposits: Decimal::ZERO,
            bonuses: Decimal::ZERO,
            withdrawals: Decimal::ZERO,
            commission: Decimal::ZERO,
            in_escrow: Decimal::ZERO,
        }
    }

    /// Record a verified deposit credit.
    pub fn record_deposit(&mut self, amount: Decimal) {
        self.deposits += amount;
    }

    /// Record a referral bonus credit.
    pub fn record_bonus(&mut self, amount: Decimal) {
        self.bonuses += amount;
    }

    /// Record a withdrawal reservation (winnings debited at request time).
    pub fn record_withdrawal_reserved(&mut self, amount: Decimal) {
        self.withdrawals += amount;
    }

    /// Record a rejected withdrawal (reservation returned to winnings).
    pub fn record_withdrawal_returned(&mut self, amount: Decimal) {
        self.withdrawals -= amount;
    }

    /// Record commission taken at settlement.
    pub fn record_commission(&mut self, amount: Decimal) {
        self.commission += amount;
    }

    /// Record a stake entering battle escrow.
    pub fn record_stake(&mut self, amount: Decimal) {
        self.in_escrow += amount;
    }

    /// Record escrow released by a terminal event (refund or payout pot).
    pub fn record_escrow_released(&mut self, amount: Decimal) {
        self.in_escrow -= amount;
    }

    /// Expected sum of all account balances right now.
    #[must_use]
    pub fn expected_float(&self) -> Decimal {
        self.deposits + self.bonuses - self.withdrawals - self.commission - self.in_escrow
    }

    /// Stakes currently held in battle escrow.
    #[must_use]
    pub fn in_escrow(&self) -> Decimal {
        self.in_escrow
    }

    /// Verify the ledger's actual float against the expectation.
    ///
    /// # Errors
    /// Returns [`StakeduelError::FloatConservationViolation`] on mismatch.
    pub fn verify(&self, ledger: &WalletLedger) -> Result<()> {
        let actual = ledger.total_float();
        let expected = self.expected_float();
        if actual != expected {
            tracing::error!(%actual, %expected, "float conservation violated");
            return Err(StakeduelError::FloatConservationViolation {
                reason: format!(
                    "actual float {actual} != expected {expected} (deposits={}, bonuses={}, \
                     withdrawals={}, commission={}, in_escrow={})",
                    self.deposits, self.bonuses, self.withdrawals, self.commission, self.in_escrow,
                ),
            });
        }
        Ok(())
    }
}

impl Default for FloatConservation {
    fn default() -> Self {
        Self::new()
    }
}
