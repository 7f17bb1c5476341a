//! Account model for the StakeDuel wallet ledger.
//!
//! Every user carries two balances: `deposit_balance` (verified top-ups,
//! stakeable but not withdrawable) and `winnings_balance` (prizes, refunds,
//! bonuses and penalties — the only withdrawable balance).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Which of the two balances a credit lands in.
///
/// The target is explicit at every call site because deposits, refunds and
/// prizes have different ledger destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceTarget {
    /// Verified external top-ups. Stakeable, not withdrawable.
    Deposit,
    /// Prizes, refunds, bonuses, penalties. Withdrawable.
    Winnings,
}

impl std::fmt::Display for BalanceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Winnings => write!(f, "WINNINGS"),
        }
    }
}

/// A short human-shareable referral code, derived deterministically from
/// the owning user's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferralCode(pub String);

impl ReferralCode {
    /// Derive the code from a user id: first 4 bytes of
    /// SHA-256("stakeduel:refcode:" || uuid bytes), hex, uppercased.
    #[must_use]
    pub fn derive(user_id: UserId) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"stakeduel:refcode:v1:");
        hasher.update(user_id.0.as_bytes());
        let hash = hasher.finalize();
        Self(hex::encode(&hash[..4]).to_uppercase())
    }
}

impl std::fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's wallet account: two balances plus lifetime game stats.
///
/// Accounts are mutated exclusively through the wallet ledger's debit/credit
/// primitives and the stat increments applied during settlement. They are
/// never deleted, only deactivated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    /// Funds from verified external deposits. Always >= 0.
    pub deposit_balance: Decimal,
    /// Funds from prizes, refunds, bonuses, penalties. Always >= 0.
    pub winnings_balance: Decimal,
    /// Lifetime count of battles this account has completed.
    pub games_played: u64,
    /// Lifetime count of battles won. Invariant: `games_won <= games_played`.
    pub games_won: u64,
    pub referral_code: ReferralCode,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a fresh account with zero balances and a derived referral code.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            deposit_balance: Decimal::ZERO,
            winnings_balance: Decimal::ZERO,
            games_played: 0,
            games_won: 0,
            referral_code: ReferralCode::derive(id),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Combined stakeable balance (deposit + winnings).
    #[must_use]
    pub fn total_balance(&self) -> Decimal {
        self.deposit_balance + self.winnings_balance
    }

    /// Whether this account holds no funds at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.deposit_balance.is_zero() && self.winnings_balance.is_zero()
    }

    /// Whether the account can cover a stake of `amount`.
    #[must_use]
    pub fn can_stake(&self, amount: Decimal) -> bool {
        self.is_active && self.total_balance() >= amount
    }
}
