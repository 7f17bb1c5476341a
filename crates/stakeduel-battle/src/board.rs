//! The battle board — store and non-terminal lifecycle operations.
//!
//! Every operation re-checks the battle's status under the same exclusive
//! borrow that applies the write, so a request that lost a race observes
//! the new status and gets a defined rejection, never a lost update. Fund
//! movements (the stake debits at creation and acceptance) go through the
//! wallet ledger inside the same unit: the debit is checked and applied
//! before the battle write, and a failed debit leaves no trace.

use rust_decimal::Decimal;
use std::collections::HashMap;

use stakeduel_ledger::WalletLedger;
use stakeduel_types::{
    Battle, BattleId, BattleStatus, OutcomeClaim, Result, ResultClaim, StakeduelError, UserId,
};

/// Store and state machine for all battles.
pub struct BattleBoard {
    battles: HashMap<BattleId, Battle>,
}

impl BattleBoard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            battles: HashMap::new(),
        }
    }

    /// Create a battle: validate the stake, debit the creator, write the
    /// battle in OPEN state. Debit and battle-write succeed or fail
    /// together.
    ///
    /// # Errors
    /// - `InvalidStake` if `amount < min_stake`
    /// - `InsufficientFunds` if the creator cannot cover the stake
    pub fn create(
        &mut self,
        ledger: &mut WalletLedger,
        creator_id: UserId,
        amount: Decimal,
        min_stake: Decimal,
    ) -> Result<BattleId> {
        if amount < min_stake {
            return Err(StakeduelError::InvalidStake {
                reason: format!("stake {amount} is below the minimum {min_stake}"),
            });
        }

        // Stake debit first; if it fails nothing has been written.
        ledger.debit(creator_id, amount)?;

        let battle = Battle::new(creator_id, amount);
        let battle_id = battle.id;
        self.battles.insert(battle_id, battle);

        tracing::info!(%battle_id, %creator_id, %amount, "battle created");
        Ok(battle_id)
    }

    /// Accept an open battle as the second player: debit the opponent's
    /// stake and move to WAITING_FOR_PLAYERS_READY.
    ///
    /// The status precondition is evaluated under the same borrow as the
    /// write, so of two racing accepts exactly one succeeds; the loser
    /// observes the new status and gets `BattleNotOpen`.
    ///
    /// # Errors
    /// - `BattleNotFound`, `BattleNotOpen`, `SelfAccept`
    /// - `InsufficientFunds` if the opponent cannot cover the stake
    pub fn accept(
        &mut self,
        ledger: &mut WalletLedger,
        battle_id: BattleId,
        opponent_id: UserId,
    ) -> Result<()> {
        let battle = self
            .battles
            .get(&battle_id)
            .ok_or(StakeduelError::BattleNotFound(battle_id))?;

        if battle.status != BattleStatus::Open {
            return Err(StakeduelError::BattleNotOpen {
                battle_id,
                status: battle.status,
            });
        }
        if battle.creator_id == opponent_id {
            return Err(StakeduelError::SelfAccept(battle_id));
        }

        let amount = battle.amount;
        ledger.debit(opponent_id, amount)?;

        let battle = self
            .battles
            .get_mut(&battle_id)
            .ok_or(StakeduelError::BattleNotFound(battle_id))?;
        battle.opponent_id = Some(opponent_id);
        battle.advance(BattleStatus::WaitingForPlayersReady);

        tracing::info!(%battle_id, %opponent_id, %amount, "battle accepted");
        Ok(())
    }

    /// Signal readiness. The transition to INPROGRESS fires only when both
    /// participants are marked ready. No funds movement. Re-signalling
    /// after the battle has started is a benign no-op.
    ///
    /// # Errors
    /// - `BattleNotFound`, `NotAParticipant`
    /// - `InvalidTransition` if the battle is not in the readiness phase
    pub fn mark_ready(&mut self, battle_id: BattleId, user_id: UserId) -> Result<()> {
        let battle = self
            .battles
            .get_mut(&battle_id)
            .ok_or(StakeduelError::BattleNotFound(battle_id))?;

        if !battle.is_participant(user_id) {
            return Err(StakeduelError::NotAParticipant { battle_id, user_id });
        }

        match battle.status {
            BattleStatus::WaitingForPlayersReady => {}
            // Already past the handshake and this player had signalled:
            // tolerate the retry.
            BattleStatus::InProgress if battle.ready_players.contains(&user_id) => {
                return Ok(());
            }
            status => {
                return Err(StakeduelError::InvalidTransition {
                    battle_id,
                    status,
                    requested: BattleStatus::InProgress,
                });
            }
        }

        battle.ready_players.insert(user_id);
        if battle.ready_players.len() == 2 {
            battle.advance(BattleStatus::InProgress);
            tracing::info!(%battle_id, "both players ready, battle in progress");
        } else {
            battle.touch();
        }
        Ok(())
    }

    /// Submit a result claim with optional proof. Moves the battle to
    /// RESULT_PENDING awaiting adjudication; the claim alone never
    /// determines the winner. Resubmission by the same player overwrites
    /// their earlier claim.
    ///
    /// # Errors
    /// - `BattleNotFound`, `NotAParticipant`
    /// - `InvalidTransition` unless the battle is INPROGRESS or RESULT_PENDING
    pub fn submit_result(
        &mut self,
        battle_id: BattleId,
        user_id: UserId,
        claim: OutcomeClaim,
        proof_ref: Option<String>,
    ) -> Result<()> {
        let battle = self
            .battles
            .get_mut(&battle_id)
            .ok_or(StakeduelError::BattleNotFound(battle_id))?;

        if !battle.is_participant(user_id) {
            return Err(StakeduelError::NotAParticipant { battle_id, user_id });
        }
        if !matches!(
            battle.status,
            BattleStatus::InProgress | BattleStatus::ResultPending
        ) {
            return Err(StakeduelError::InvalidTransition {
                battle_id,
                status: battle.status,
                requested: BattleStatus::ResultPending,
            });
        }

        battle.result_claims.insert(
            user_id,
            ResultClaim {
                claim,
                proof_ref,
                submitted_at: chrono::Utc::now(),
            },
        );
        if battle.status == BattleStatus::InProgress {
            battle.advance(BattleStatus::ResultPending);
        } else {
            battle.touch();
        }
        Ok(())
    }

    /// Look up a battle.
    ///
    /// # Errors
    /// Returns `BattleNotFound` if no battle exists for `battle_id`.
    pub fn battle(&self, battle_id: BattleId) -> Result<&Battle> {
        self.battles
            .get(&battle_id)
            .ok_or(StakeduelError::BattleNotFound(battle_id))
    }

    /// Mutable battle access for the terminal engines (settlement and
    /// cancellation). Lifecycle callers use the dedicated operations.
    ///
    /// # Errors
    /// Returns `BattleNotFound` if no battle exists for `battle_id`.
    pub fn battle_mut(&mut self, battle_id: BattleId) -> Result<&mut Battle> {
        self.battles
            .get_mut(&battle_id)
            .ok_or(StakeduelError::BattleNotFound(battle_id))
    }

    /// Battles currently open for acceptance, oldest first (matching is
    /// first-available).
    #[must_use]
    pub fn open_battles(&self) -> Vec<&Battle> {
        let mut open: Vec<&Battle> = self
            .battles
            .values()
            .filter(|b| b.status == BattleStatus::Open)
            .collect();
        open.sort_by_key(|b| b.id);
        open
    }

    /// Number of battles on the board (all states).
    #[must_use]
    pub fn len(&self) -> usize {
        self.battles.len()
    }

    /// Whether the board holds no battles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }
}

impl Default for BattleBoard {
    fn default() -> Self {
        Self::new()
    }
}
