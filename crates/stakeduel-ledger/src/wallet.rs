//! The wallet ledger — the only component allowed to mutate balances.
//!
//! Two primitives cover every fund movement in the system:
//! [`WalletLedger::debit`] (stake collection and withdrawal reservation,
//! deposit balance consumed first) and [`WalletLedger::credit`] (verified
//! deposits, refunds, prizes, bonuses, penalties — each with an explicit
//! target balance). All mutations are atomic: either the full operation
//! succeeds or the account is unchanged.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stakeduel_types::{
    Account, BalanceTarget, ReferralCode, Result, StakeduelError, UserId,
};

/// Source of truth for all account state.
///
/// The battle lifecycle, settlement and cancellation engines, and the
/// transaction ledger all call into it; none of them touch balances
/// directly.
pub struct WalletLedger {
    accounts: HashMap<UserId, Account>,
}

impl WalletLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Open a fresh account with zero balances.
    pub fn open_account(&mut self) -> UserId {
        let account = Account::new(UserId::new());
        let id = account.id;
        self.accounts.insert(id, account);
        id
    }

    /// Look up an account.
    ///
    /// # Errors
    /// Returns `AccountNotFound` if no account exists for `user_id`.
    pub fn account(&self, user_id: UserId) -> Result<&Account> {
        self.accounts
            .get(&user_id)
            .ok_or(StakeduelError::AccountNotFound(user_id))
    }

    /// Resolve a referral code back to its owning account.
    #[must_use]
    pub fn find_by_referral_code(&self, code: &ReferralCode) -> Option<&Account> {
        self.accounts.values().find(|a| &a.referral_code == code)
    }

    fn active_account_mut(&mut self, user_id: UserId) -> Result<&mut Account> {
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(StakeduelError::AccountNotFound(user_id))?;
        if !account.is_active {
            return Err(StakeduelError::AccountDeactivated(user_id));
        }
        Ok(account)
    }

    /// Debit `amount` from the account, deposit balance first, remainder
    /// from winnings. The combined precondition check and the two balance
    /// writes happen under one exclusive borrow, so no interleaving
    /// operation can observe or exploit an intermediate state.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if deposit + winnings < amount; the
    /// account is left untouched.
    pub fn debit(&mut self, user_id: UserId, amount: Decimal) -> Result<()> {
        let account = self.active_account_mut(user_id)?;

        let available = account.total_balance();
        if available < amount {
            return Err(StakeduelError::InsufficientFunds {
                needed: amount,
                available,
            });
        }

        let from_deposit = account.deposit_balance.min(amount);
        account.deposit_balance -= from_deposit;
        account.winnings_balance -= amount - from_deposit;
        debug_assert!(account.winnings_balance >= Decimal::ZERO);
        Ok(())
    }

    /// Debit `amount` from the winnings balance only. Used to reserve a
    /// withdrawal: the deposit balance is never withdrawable.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if winnings < amount.
    pub fn debit_winnings(&mut self, user_id: UserId, amount: Decimal) -> Result<()> {
        let account = self.active_account_mut(user_id)?;
        if account.winnings_balance < amount {
            return Err(StakeduelError::InsufficientFunds {
                needed: amount,
                available: account.winnings_balance,
            });
        }
        account.winnings_balance -= amount;
        Ok(())
    }

    /// Credit `amount` to the given balance. The target is explicit:
    /// verified deposits land in the deposit balance; refunds, prizes,
    /// bonuses and penalties land in winnings.
    ///
    /// Credits reach deactivated accounts: a terminal event (payout,
    /// refund, bonus, returned reservation) still owes the account its
    /// funds after a ban, and must never fail halfway through.
    ///
    /// # Errors
    /// Returns `AccountNotFound` if no account exists for `user_id`.
    pub fn credit(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        target: BalanceTarget,
    ) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(StakeduelError::AccountNotFound(user_id))?;
        match target {
            BalanceTarget::Deposit => account.deposit_balance += amount,
            BalanceTarget::Winnings => account.winnings_balance += amount,
        }
        Ok(())
    }

    /// Increment the lifetime game stats for one participant of a settled
    /// battle. Returns the **pre-increment** `games_played` so the caller
    /// can fire the first-game referral trigger.
    ///
    /// # Errors
    /// Returns `AccountNotFound` if no account exists for `user_id`.
    pub fn record_game(&mut self, user_id: UserId, won: bool) -> Result<u64> {
        // Settlement must reach deactivated accounts too: an in-flight
        // battle still settles after a ban.
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(StakeduelError::AccountNotFound(user_id))?;
        let prior = account.games_played;
        account.games_played += 1;
        if won {
            account.games_won += 1;
        }
        debug_assert!(account.games_won <= account.games_played);
        Ok(prior)
    }

    /// Deactivate an account. Accounts are never deleted.
    ///
    /// # Errors
    /// Returns `AccountNotFound` if no account exists for `user_id`.
    pub fn deactivate(&mut self, user_id: UserId) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or(StakeduelError::AccountNotFound(user_id))?;
        account.is_active = false;
        Ok(())
    }

    /// Sum of all balances across all accounts — the actual user float.
    #[must_use]
    pub fn total_float(&self) -> Decimal {
        self.accounts.values().map(Account::total_balance).sum()
    }

    /// Number of accounts in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the ledger holds no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}
