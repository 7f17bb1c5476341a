//! Deposit / withdrawal transaction ledger.
//!
//! Deposits: the user submits a pending record with external proof; an
//! administrator's verification transitions it PENDING -> COMPLETED, which
//! credits the deposit balance exactly once. Rejection has no ledger
//! effect.
//!
//! Withdrawals: the amount is reserved — debited from winnings — at
//! request time, so approval only finalizes the record, and rejection
//! returns the reservation. A repeat of an already-applied verification or
//! rejection is a benign no-op so administrator retries are harmless.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use stakeduel_ledger::WalletLedger;
use stakeduel_types::{
    BalanceTarget, Result, StakeduelError, Transaction, TransactionId, TransactionKind,
    TransactionStatus, UserId,
};

/// What a verify/approve/reject call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The transition was applied by this call.
    Applied,
    /// The record was already in the requested terminal status; no-op.
    AlreadyProcessed,
}

/// Store and lifecycle operations for deposit/withdrawal records.
pub struct TransactionLedger {
    transactions: HashMap<TransactionId, Transaction>,
}

impl TransactionLedger {
    /// Create an empty transaction ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transactions: HashMap::new(),
        }
    }

    /// Submit a pending deposit backed by external proof. No ledger effect
    /// until verification.
    ///
    /// # Errors
    /// - `InvalidStake` if `amount <= 0`
    /// - `AccountNotFound` / `AccountDeactivated`
    pub fn submit_deposit(
        &mut self,
        ledger: &WalletLedger,
        user_id: UserId,
        amount: Decimal,
        proof_ref: String,
    ) -> Result<TransactionId> {
        if amount <= Decimal::ZERO {
            return Err(StakeduelError::InvalidStake {
                reason: format!("deposit amount must be positive, got {amount}"),
            });
        }
        let account = ledger.account(user_id)?;
        if !account.is_active {
            return Err(StakeduelError::AccountDeactivated(user_id));
        }

        let tx = Transaction::pending(
            user_id,
            TransactionKind::Deposit,
            amount,
            Some(proof_ref),
        );
        let tx_id = tx.id;
        self.transactions.insert(tx_id, tx);
        Ok(tx_id)
    }

    /// Administrative verification of a deposit: PENDING -> COMPLETED plus
    /// exactly one deposit-balance credit. Verifying an already-completed
    /// deposit is a no-op.
    ///
    /// # Errors
    /// - `TransactionNotFound`, `WrongTransactionKind`
    /// - `TransactionRejected` if the record was already rejected
    pub fn verify_deposit(
        &mut self,
        ledger: &mut WalletLedger,
        tx_id: TransactionId,
    ) -> Result<ProcessOutcome> {
        let tx = self
            .transactions
            .get_mut(&tx_id)
            .ok_or(StakeduelError::TransactionNotFound(tx_id))?;
        if tx.kind != TransactionKind::Deposit {
            return Err(StakeduelError::WrongTransactionKind {
                tx_id,
                expected: "deposit",
            });
        }

        match tx.status {
            TransactionStatus::Completed => {
                tracing::info!(%tx_id, "deposit already verified, no-op");
                return Ok(ProcessOutcome::AlreadyProcessed);
            }
            TransactionStatus::Rejected { .. } => {
                return Err(StakeduelError::TransactionRejected(tx_id));
            }
            TransactionStatus::Pending => {}
        }

        ledger.credit(tx.user_id, tx.amount, BalanceTarget::Deposit)?;
        tx.status = TransactionStatus::Completed;
        tx.processed_at = Some(Utc::now());

        tracing::info!(%tx_id, user_id = %tx.user_id, amount = %tx.amount, "deposit verified");
        Ok(ProcessOutcome::Applied)
    }

    /// Request a withdrawal of winnings. The amount is reserved by
    /// debiting the winnings balance here, inside the same unit that
    /// writes the pending record — approval cannot find the balance gone.
    ///
    /// # Errors
    /// - `InvalidStake` if `amount <= 0`
    /// - `InsufficientFunds` if winnings < amount
    pub fn request_withdrawal(
        &mut self,
        ledger: &mut WalletLedger,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<TransactionId> {
        if amount <= Decimal::ZERO {
            return Err(StakeduelError::InvalidStake {
                reason: format!("withdrawal amount must be positive, got {amount}"),
            });
        }

        ledger.debit_winnings(user_id, amount)?;

        let tx = Transaction::pending(user_id, TransactionKind::Withdrawal, amount, None);
        let tx_id = tx.id;
        self.transactions.insert(tx_id, tx);
        Ok(tx_id)
    }

    /// Administrative approval of a withdrawal: finalizes the record. The
    /// funds left the winnings balance at request time, so there is
    /// nothing further to move. Approving twice is a no-op.
    ///
    /// # Errors
    /// - `TransactionNotFound`, `WrongTransactionKind`
    /// - `TransactionRejected` if the record was already rejected
    pub fn approve_withdrawal(&mut self, tx_id: TransactionId) -> Result<ProcessOutcome> {
        let tx = self
            .transactions
            .get_mut(&tx_id)
            .ok_or(StakeduelError::TransactionNotFound(tx_id))?;
        if tx.kind != TransactionKind::Withdrawal {
            return Err(StakeduelError::WrongTransactionKind {
                tx_id,
                expected: "withdrawal",
            });
        }

        match tx.status {
            TransactionStatus::Completed => {
                tracing::info!(%tx_id, "withdrawal already approved, no-op");
                return Ok(ProcessOutcome::AlreadyProcessed);
            }
            TransactionStatus::Rejected { .. } => {
                return Err(StakeduelError::TransactionRejected(tx_id));
            }
            TransactionStatus::Pending => {}
        }

        tx.status = TransactionStatus::Completed;
        tx.processed_at = Some(Utc::now());
        tracing::info!(%tx_id, user_id = %tx.user_id, amount = %tx.amount, "withdrawal approved");
        Ok(ProcessOutcome::Applied)
    }

    /// Administrative rejection: PENDING -> REJECTED. A rejected
    /// withdrawal returns its reservation to the winnings balance; a
    /// rejected deposit has no ledger effect. Rejecting twice is a no-op.
    ///
    /// # Errors
    /// - `TransactionNotFound`
    /// - `TransactionCompleted` if the record was already completed
    pub fn reject(
        &mut self,
        ledger: &mut WalletLedger,
        tx_id: TransactionId,
        reason: String,
    ) -> Result<ProcessOutcome> {
        let tx = self
            .transactions
            .get_mut(&tx_id)
            .ok_or(StakeduelError::TransactionNotFound(tx_id))?;

        match tx.status {
            TransactionStatus::Rejected { .. } => {
                tracing::info!(%tx_id, "transaction already rejected, no-op");
                return Ok(ProcessOutcome::AlreadyProcessed);
            }
            TransactionStatus::Completed => {
                return Err(StakeduelError::TransactionCompleted(tx_id));
            }
            TransactionStatus::Pending => {}
        }

        if tx.kind == TransactionKind::Withdrawal {
            ledger.credit(tx.user_id, tx.amount, BalanceTarget::Winnings)?;
        }
        tx.status = TransactionStatus::Rejected { reason };
        tx.processed_at = Some(Utc::now());

        tracing::info!(%tx_id, user_id = %tx.user_id, kind = %tx.kind, "transaction rejected");
        Ok(ProcessOutcome::Applied)
    }

    /// Look up a transaction record.
    ///
    /// # Errors
    /// Returns `TransactionNotFound` if no record exists for `tx_id`.
    pub fn transaction(&self, tx_id: TransactionId) -> Result<&Transaction> {
        self.transactions
            .get(&tx_id)
            .ok_or(StakeduelError::TransactionNotFound(tx_id))
    }

    /// All records for one user, oldest first.
    #[must_use]
    pub fn for_user(&self, user_id: UserId) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .collect();
        txs.sort_by_key(|t| t.id);
        txs
    }
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}
