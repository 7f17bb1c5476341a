//! One-time referral bonus trigger.
//!
//! A referral is registered at the referred user's signup and pays the
//! referrer exactly once, the first time the referred user's lifetime
//! `games_played` leaves zero. The trigger is lookup-then-conditional-
//! transition: it is called from both the winner and the loser path of
//! settlement and must be safe to invoke redundantly.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stakeduel_ledger::WalletLedger;
use stakeduel_types::{
    BalanceTarget, Referral, ReferralId, ReferralStatus, Result, StakeduelError, UserId,
};

/// Record of one bonus credit to a referrer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralBonusPayout {
    pub referral_id: ReferralId,
    pub referrer_id: UserId,
    pub referred_id: UserId,
    pub amount: Decimal,
}

/// Store of referral pairings, indexed by the referred user.
pub struct ReferralRegistry {
    referrals: HashMap<ReferralId, Referral>,
    by_referred: HashMap<UserId, ReferralId>,
}

impl ReferralRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            referrals: HashMap::new(),
            by_referred: HashMap::new(),
        }
    }

    /// Register a pending referral pairing.
    ///
    /// # Errors
    /// - `SelfReferral` if referrer and referred are the same user
    /// - `DuplicateReferral` if the referred user already has a pairing
    pub fn register(&mut self, referrer_id: UserId, referred_id: UserId) -> Result<ReferralId> {
        if referrer_id == referred_id {
            return Err(StakeduelError::SelfReferral(referred_id));
        }
        if self.by_referred.contains_key(&referred_id) {
            return Err(StakeduelError::DuplicateReferral(referred_id));
        }

        let referral = Referral::pending(referrer_id, referred_id);
        let id = referral.id;
        self.by_referred.insert(referred_id, id);
        self.referrals.insert(id, referral);
        Ok(id)
    }

    /// Fire the first-game trigger for `referred_id`.
    ///
    /// If a pending referral exists, credits `bonus` to the referrer's
    /// winnings and marks the referral completed — then and only then
    /// returns the payout. No pending referral (none registered, or
    /// already completed) is a no-op, so redundant invocation can never
    /// pay twice.
    ///
    /// # Errors
    /// Propagates ledger errors from the bonus credit.
    pub fn trigger_first_game(
        &mut self,
        ledger: &mut WalletLedger,
        referred_id: UserId,
        bonus: Decimal,
    ) -> Result<Option<ReferralBonusPayout>> {
        let Some(&referral_id) = self.by_referred.get(&referred_id) else {
            return Ok(None);
        };
        let referral = self
            .referrals
            .get_mut(&referral_id)
            .ok_or(StakeduelError::ReferralNotFound(referral_id))?;
        if referral.status == ReferralStatus::Completed {
            return Ok(None);
        }

        ledger.credit(referral.referrer_id, bonus, BalanceTarget::Winnings)?;
        referral.status = ReferralStatus::Completed;
        referral.completed_at = Some(Utc::now());

        tracing::info!(
            %referral_id,
            referrer_id = %referral.referrer_id,
            %referred_id,
            %bonus,
            "referral bonus paid"
        );
        Ok(Some(ReferralBonusPayout {
            referral_id,
            referrer_id: referral.referrer_id,
            referred_id,
            amount: bonus,
        }))
    }

    /// Look up a referral record.
    ///
    /// # Errors
    /// Returns `ReferralNotFound` if no record exists for `referral_id`.
    pub fn referral(&self, referral_id: ReferralId) -> Result<&Referral> {
        self.referrals
            .get(&referral_id)
            .ok_or(StakeduelError::ReferralNotFound(referral_id))
    }

    /// The referral pairing for a referred user, if any.
    #[must_use]
    pub fn for_referred(&self, referred_id: UserId) -> Option<&Referral> {
        self.by_referred
            .get(&referred_id)
            .and_then(|id| self.referrals.get(id))
    }
}

impl Default for ReferralRegistry {
    fn default() -> Self {
        Self::new()
    }
}
