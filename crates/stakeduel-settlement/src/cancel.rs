//! Cancellation of a battle — the refund path.
//!
//! Before an opponent joins, cancellation is a plain refund of the
//! creator's stake. Once both sides have staked, the canceller pays a
//! flat penalty to the other party: refunds and the penalty transfer are
//! computed as net amounts and applied in one unit, so no intermediate
//! balance is ever observed and the penalty can never push a balance
//! negative. Refunds land in the winnings balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stakeduel_battle::BattleBoard;
use stakeduel_ledger::WalletLedger;
use stakeduel_types::{
    BalanceTarget, BattleId, BattleStatus, Result, StakeduelError, UserId,
};

/// What a cancel call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The battle was cancelled and stakes refunded by this call.
    Cancelled(CancellationReceipt),
    /// The battle was already terminal; nothing was applied.
    AlreadyTerminal,
}

/// Record of a single cancellation's fund movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationReceipt {
    pub battle_id: BattleId,
    pub cancelled_by: UserId,
    /// Net winnings credit per participant. Sums to the escrow released.
    pub refunds: Vec<(UserId, Decimal)>,
    pub cancelled_at: DateTime<Utc>,
}

impl CancellationReceipt {
    /// Total escrow released back to accounts by this cancellation.
    #[must_use]
    pub fn total_released(&self) -> Decimal {
        self.refunds.iter().map(|(_, amount)| *amount).sum()
    }
}

/// Applies the financial outcome of a cancelled battle.
pub struct CancellationEngine {
    penalty: Decimal,
}

impl CancellationEngine {
    /// Create an engine with the given flat cancellation penalty.
    #[must_use]
    pub fn new(penalty: Decimal) -> Self {
        Self { penalty }
    }

    /// Cancel a battle on behalf of `requester_id`.
    ///
    /// # Errors
    /// - `BattleNotFound`, `NotAParticipant`
    /// - `NotCancellable` if the battle is INPROGRESS or RESULT_PENDING
    pub fn cancel(
        &self,
        board: &mut BattleBoard,
        ledger: &mut WalletLedger,
        battle_id: BattleId,
        requester_id: UserId,
    ) -> Result<CancelOutcome> {
        let battle = board.battle(battle_id)?;

        if battle.status.is_terminal() {
            tracing::info!(%battle_id, "cancel on terminal battle, no-op");
            return Ok(CancelOutcome::AlreadyTerminal);
        }
        if !battle.is_participant(requester_id) {
            return Err(StakeduelError::NotAParticipant {
                battle_id,
                user_id: requester_id,
            });
        }
        if !battle.status.can_transition(BattleStatus::Cancelled) {
            return Err(StakeduelError::NotCancellable {
                battle_id,
                status: battle.status,
            });
        }

        let amount = battle.amount;
        let refunds = match battle.other_participant(requester_id) {
            // Net effect of refund + penalty transfer, applied as one unit.
            Some(other) => {
                debug_assert!(self.penalty <= amount);
                vec![
                    (requester_id, amount - self.penalty),
                    (other, amount + self.penalty),
                ]
            }
            None => vec![(requester_id, amount)],
        };

        for (user, _) in &refunds {
            ledger.account(*user)?;
        }
        for (user, refund) in &refunds {
            ledger.credit(*user, *refund, BalanceTarget::Winnings)?;
        }

        let cancelled_at = Utc::now();
        let battle = board.battle_mut(battle_id)?;
        battle.completed_at = Some(cancelled_at);
        battle.advance(BattleStatus::Cancelled);

        tracing::info!(%battle_id, %requester_id, %amount, "battle cancelled");
        Ok(CancelOutcome::Cancelled(CancellationReceipt {
            battle_id,
            cancelled_by: requester_id,
            refunds,
            cancelled_at,
        }))
    }
}
