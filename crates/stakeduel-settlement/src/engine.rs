//! The assembled wagering engine.
//!
//! [`WagerEngine`] wires the wallet ledger, battle board, terminal
//! engines, referral registry and transaction ledger behind the call
//! surface the API layer and admin console use. It also keeps the float
//! conservation auditor up to date on every fund flow that enters or
//! leaves the user float.
//!
//! Callers supply already-authenticated user and admin ids; identity is
//! an external collaborator. Admin ids are logged for the audit trail,
//! never verified here.

use rust_decimal::Decimal;
use stakeduel_battle::BattleBoard;
use stakeduel_ledger::{FloatConservation, WalletLedger};
use stakeduel_types::{
    Account, Battle, BattleId, EngineConfig, OutcomeClaim, ReferralCode, ReferralId, Result,
    Transaction, TransactionId, UserId,
};

use crate::cancel::{CancelOutcome, CancellationEngine};
use crate::referral_bonus::ReferralRegistry;
use crate::settle::{ResolveOutcome, SettlementEngine};
use crate::transactions::{ProcessOutcome, TransactionLedger};

/// The complete wagering core behind one call surface.
pub struct WagerEngine {
    config: EngineConfig,
    ledger: WalletLedger,
    board: BattleBoard,
    referrals: ReferralRegistry,
    transactions: TransactionLedger,
    conservation: FloatConservation,
    settlement: SettlementEngine,
    cancellation: CancellationEngine,
}

impl WagerEngine {
    /// Build an engine from a validated configuration.
    ///
    /// # Errors
    /// Returns `Configuration` if the config is incoherent.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let settlement = SettlementEngine::new(config.commission_rate, config.referral_bonus);
        let cancellation = CancellationEngine::new(config.cancellation_penalty);
        Ok(Self {
            config,
            ledger: WalletLedger::new(),
            board: BattleBoard::new(),
            referrals: ReferralRegistry::new(),
            transactions: TransactionLedger::new(),
            conservation: FloatConservation::new(),
            settlement,
            cancellation,
        })
    }

    // ---------------------------------------------------------------
    // Accounts and referrals
    // ---------------------------------------------------------------

    /// Open a fresh account, optionally registering a referral pairing
    /// from a shared code. An unknown code is ignored (the signup must
    /// not fail over a mistyped code); a valid one registers a pending
    /// referral paid on the new user's first completed game.
    pub fn open_account(&mut self, referred_by: Option<&ReferralCode>) -> UserId {
        let user_id = self.ledger.open_account();
        if let Some(code) = referred_by {
            match self.ledger.find_by_referral_code(code) {
                Some(referrer) => {
                    let referrer_id = referrer.id;
                    // A fresh UserId cannot already hold a pairing, so this
                    // only fails if that assumption breaks.
                    if let Err(err) = self.referrals.register(referrer_id, user_id) {
                        tracing::warn!(%err, %user_id, "referral registration skipped");
                    }
                }
                None => {
                    tracing::warn!(%code, %user_id, "unknown referral code ignored at signup");
                }
            }
        }
        user_id
    }

    /// Register a referral pairing between two existing accounts. The
    /// signup path handles the common case; this covers backfills.
    ///
    /// # Errors
    /// `AccountNotFound`, `SelfReferral`, `DuplicateReferral`.
    pub fn register_referral(
        &mut self,
        referrer_id: UserId,
        referred_id: UserId,
    ) -> Result<ReferralId> {
        self.ledger.account(referrer_id)?;
        self.ledger.account(referred_id)?;
        self.referrals.register(referrer_id, referred_id)
    }

    /// Look up an account.
    ///
    /// # Errors
    /// Returns `AccountNotFound` for an unknown user.
    pub fn account(&self, user_id: UserId) -> Result<&Account> {
        self.ledger.account(user_id)
    }

    /// Deactivate an account (administrative).
    ///
    /// # Errors
    /// Returns `AccountNotFound` for an unknown user.
    pub fn deactivate_account(&mut self, user_id: UserId, admin_id: UserId) -> Result<()> {
        tracing::info!(%user_id, %admin_id, "account deactivated");
        self.ledger.deactivate(user_id)
    }

    // ---------------------------------------------------------------
    // Battle lifecycle
    // ---------------------------------------------------------------

    /// Create a battle; the creator's stake is debited immediately.
    ///
    /// # Errors
    /// `InvalidStake`, `InsufficientFunds`.
    pub fn create_battle(&mut self, creator_id: UserId, amount: Decimal) -> Result<BattleId> {
        let battle_id =
            self.board
                .create(&mut self.ledger, creator_id, amount, self.config.min_stake)?;
        self.conservation.record_stake(amount);
        Ok(battle_id)
    }

    /// Accept an open battle; the opponent's stake is debited.
    ///
    /// # Errors
    /// `BattleNotOpen`, `SelfAccept`, `InsufficientFunds`.
    pub fn accept_battle(&mut self, battle_id: BattleId, opponent_id: UserId) -> Result<()> {
        self.board
            .accept(&mut self.ledger, battle_id, opponent_id)?;
        let amount = self.board.battle(battle_id)?.amount;
        self.conservation.record_stake(amount);
        Ok(())
    }

    /// Signal readiness; the battle starts once both players have.
    ///
    /// # Errors
    /// `NotAParticipant`, `InvalidTransition`.
    pub fn mark_ready(&mut self, battle_id: BattleId, user_id: UserId) -> Result<()> {
        self.board.mark_ready(battle_id, user_id)
    }

    /// Submit a result claim with optional external proof reference.
    ///
    /// # Errors
    /// `NotAParticipant`, `InvalidTransition`.
    pub fn submit_result(
        &mut self,
        battle_id: BattleId,
        user_id: UserId,
        claim: OutcomeClaim,
        proof_ref: Option<String>,
    ) -> Result<()> {
        self.board.submit_result(battle_id, user_id, claim, proof_ref)
    }

    /// Administrative adjudication: settle the battle in favour of
    /// `winner_id`. Safe to retry; a repeat is a no-op.
    ///
    /// # Errors
    /// `NotResolvable`, `InvalidWinner`.
    pub fn resolve_battle(
        &mut self,
        battle_id: BattleId,
        winner_id: UserId,
        admin_id: UserId,
    ) -> Result<ResolveOutcome> {
        tracing::info!(%battle_id, %winner_id, %admin_id, "resolve requested");
        let outcome = self.settlement.resolve(
            &mut self.board,
            &mut self.ledger,
            &mut self.referrals,
            battle_id,
            winner_id,
        )?;
        if let ResolveOutcome::Settled(receipt) = &outcome {
            self.conservation
                .record_escrow_released(receipt.prize + receipt.commission);
            self.conservation.record_commission(receipt.commission);
            for bonus in &receipt.bonuses {
                self.conservation.record_bonus(bonus.amount);
            }
        }
        Ok(outcome)
    }

    /// Cancel a battle on behalf of a participant. Safe to retry; a
    /// repeat is a no-op.
    ///
    /// # Errors
    /// `NotAParticipant`, `NotCancellable`.
    pub fn cancel_battle(
        &mut self,
        battle_id: BattleId,
        requester_id: UserId,
    ) -> Result<CancelOutcome> {
        let outcome =
            self.cancellation
                .cancel(&mut self.board, &mut self.ledger, battle_id, requester_id)?;
        if let CancelOutcome::Cancelled(receipt) = &outcome {
            self.conservation
                .record_escrow_released(receipt.total_released());
        }
        Ok(outcome)
    }

    /// Look up a battle.
    ///
    /// # Errors
    /// Returns `BattleNotFound` for an unknown battle.
    pub fn battle(&self, battle_id: BattleId) -> Result<&Battle> {
        self.board.battle(battle_id)
    }

    /// Battles open for acceptance, oldest first.
    #[must_use]
    pub fn open_battles(&self) -> Vec<&Battle> {
        self.board.open_battles()
    }

    // ---------------------------------------------------------------
    // Deposits and withdrawals
    // ---------------------------------------------------------------

    /// Submit a pending deposit with external proof.
    ///
    /// # Errors
    /// `InvalidStake`, `AccountNotFound`, `AccountDeactivated`.
    pub fn submit_deposit(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        proof_ref: String,
    ) -> Result<TransactionId> {
        self.transactions
            .submit_deposit(&self.ledger, user_id, amount, proof_ref)
    }

    /// Administrative verification of a deposit. Safe to retry.
    ///
    /// # Errors
    /// `TransactionNotFound`, `TransactionRejected`, `WrongTransactionKind`.
    pub fn verify_deposit(
        &mut self,
        tx_id: TransactionId,
        admin_id: UserId,
    ) -> Result<ProcessOutcome> {
        tracing::info!(%tx_id, %admin_id, "deposit verification requested");
        let outcome = self.transactions.verify_deposit(&mut self.ledger, tx_id)?;
        if outcome == ProcessOutcome::Applied {
            let amount = self.transactions.transaction(tx_id)?.amount;
            self.conservation.record_deposit(amount);
        }
        Ok(outcome)
    }

    /// Request a withdrawal; the amount is reserved from winnings now.
    ///
    /// # Errors
    /// `InvalidStake`, `InsufficientFunds`.
    pub fn request_withdrawal(
        &mut self,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<TransactionId> {
        let tx_id = self
            .transactions
            .request_withdrawal(&mut self.ledger, user_id, amount)?;
        self.conservation.record_withdrawal_reserved(amount);
        Ok(tx_id)
    }

    /// Administrative approval of a withdrawal. Safe to retry.
    ///
    /// # Errors
    /// `TransactionNotFound`, `TransactionRejected`, `WrongTransactionKind`.
    pub fn approve_withdrawal(
        &mut self,
        tx_id: TransactionId,
        admin_id: UserId,
    ) -> Result<ProcessOutcome> {
        tracing::info!(%tx_id, %admin_id, "withdrawal approval requested");
        self.transactions.approve_withdrawal(tx_id)
    }

    /// Administrative rejection of a pending transaction. Safe to retry.
    ///
    /// # Errors
    /// `TransactionNotFound`, `TransactionCompleted`.
    pub fn reject_transaction(
        &mut self,
        tx_id: TransactionId,
        admin_id: UserId,
        reason: String,
    ) -> Result<ProcessOutcome> {
        tracing::info!(%tx_id, %admin_id, %reason, "transaction rejection requested");
        let outcome = self.transactions.reject(&mut self.ledger, tx_id, reason)?;
        if outcome == ProcessOutcome::Applied {
            let tx = self.transactions.transaction(tx_id)?;
            if tx.kind == stakeduel_types::TransactionKind::Withdrawal {
                self.conservation.record_withdrawal_returned(tx.amount);
            }
        }
        Ok(outcome)
    }

    /// Look up a transaction record.
    ///
    /// # Errors
    /// Returns `TransactionNotFound` for an unknown record.
    pub fn transaction(&self, tx_id: TransactionId) -> Result<&Transaction> {
        self.transactions.transaction(tx_id)
    }

    // ---------------------------------------------------------------
    // Invariants
    // ---------------------------------------------------------------

    /// Verify float conservation against the ledger.
    ///
    /// # Errors
    /// Returns `FloatConservationViolation` on mismatch.
    pub fn verify_conservation(&self) -> Result<()> {
        self.conservation.verify(&self.ledger)
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
