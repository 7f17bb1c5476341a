//! Settlement of a completed battle — the payout path.
//!
//! Invoked exactly once per battle, at administrative resolution:
//! 1. Check the battle is awaiting adjudication (RESULT_PENDING)
//! 2. Validate the designated winner is a participant
//! 3. Credit the commission-adjusted prize to the winner's winnings
//! 4. Increment both players' lifetime stats
//! 5. Fire the referral trigger for any player finishing their first game
//! 6. Move the battle to COMPLETED
//!
//! A resolve against an already-terminal battle is a benign no-op, so a
//! repeated administrative click or a resolve that lost a race against a
//! cancel can never pay out twice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stakeduel_battle::BattleBoard;
use stakeduel_ledger::WalletLedger;
use stakeduel_types::{
    BalanceTarget, BattleId, BattleStatus, Result, StakeduelError, UserId,
};

use crate::referral_bonus::{ReferralBonusPayout, ReferralRegistry};

/// What a resolve call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The battle was settled by this call.
    Settled(SettlementReceipt),
    /// The battle was already terminal; nothing was applied.
    AlreadyTerminal,
}

/// Record of a single settlement's fund movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub battle_id: BattleId,
    pub winner_id: UserId,
    pub loser_id: UserId,
    /// Prize credited to the winner: `2 * amount * (1 - commission_rate)`.
    pub prize: Decimal,
    /// Platform cut: `2 * amount * commission_rate`.
    pub commission: Decimal,
    /// Referral bonuses fired by first-game completions.
    pub bonuses: Vec<ReferralBonusPayout>,
    pub settled_at: DateTime<Utc>,
}

/// Applies the financial and statistical outcome of an adjudicated battle.
pub struct SettlementEngine {
    commission_rate: Decimal,
    referral_bonus: Decimal,
}

impl SettlementEngine {
    /// Create an engine with the given commission rate (fraction of the
    /// combined pot) and referral bonus amount.
    #[must_use]
    pub fn new(commission_rate: Decimal, referral_bonus: Decimal) -> Self {
        Self {
            commission_rate,
            referral_bonus,
        }
    }

    /// Resolve a battle in favour of `winner_id`.
    ///
    /// All mutations — prize credit, stat increments, referral credits,
    /// status transition — apply under one exclusive borrow of the ledger
    /// and board; every precondition is validated before the first write.
    ///
    /// # Errors
    /// - `BattleNotFound`
    /// - `NotResolvable` if the battle is not RESULT_PENDING
    /// - `InvalidWinner` if `winner_id` is not one of the two participants
    pub fn resolve(
        &self,
        board: &mut BattleBoard,
        ledger: &mut WalletLedger,
        referrals: &mut ReferralRegistry,
        battle_id: BattleId,
        winner_id: UserId,
    ) -> Result<ResolveOutcome> {
        let battle = board.battle(battle_id)?;

        if battle.status.is_terminal() {
            tracing::info!(%battle_id, "resolve on terminal battle, no-op");
            return Ok(ResolveOutcome::AlreadyTerminal);
        }
        if battle.status != BattleStatus::ResultPending {
            return Err(StakeduelError::NotResolvable {
                battle_id,
                status: battle.status,
            });
        }
        // RESULT_PENDING implies an opponent joined; guard anyway.
        let Some((creator, opponent)) = battle.participants() else {
            return Err(StakeduelError::NotResolvable {
                battle_id,
                status: battle.status,
            });
        };
        if winner_id != creator && winner_id != opponent {
            return Err(StakeduelError::InvalidWinner {
                battle_id,
                winner_id,
            });
        }
        let loser_id = if winner_id == creator { opponent } else { creator };

        // Both accounts must be reachable before any mutation.
        ledger.account(winner_id)?;
        ledger.account(loser_id)?;

        let pot = battle.amount * Decimal::TWO;
        let commission = pot * self.commission_rate;
        let prize = pot - commission;

        ledger.credit(winner_id, prize, BalanceTarget::Winnings)?;

        let winner_prior = ledger.record_game(winner_id, true)?;
        let loser_prior = ledger.record_game(loser_id, false)?;

        let mut bonuses = Vec::new();
        for (user, prior) in [(winner_id, winner_prior), (loser_id, loser_prior)] {
            if prior == 0 {
                if let Some(payout) =
                    referrals.trigger_first_game(ledger, user, self.referral_bonus)?
                {
                    bonuses.push(payout);
                }
            }
        }

        let settled_at = Utc::now();
        let battle = board.battle_mut(battle_id)?;
        battle.winner_id = Some(winner_id);
        battle.completed_at = Some(settled_at);
        battle.advance(BattleStatus::Completed);

        tracing::info!(%battle_id, %winner_id, %prize, %commission, "battle settled");
        Ok(ResolveOutcome::Settled(SettlementReceipt {
            battle_id,
            winner_id,
            loser_id,
            prize,
            commission,
            bonuses,
            settled_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakeduel_types::OutcomeClaim;

    fn engine() -> SettlementEngine {
        // 5% commission, 25 bonus.
        SettlementEngine::new(Decimal::new(5, 2), Decimal::new(25, 0))
    }

    fn fund(ledger: &mut WalletLedger, amount: i64) -> UserId {
        let user = ledger.open_account();
        ledger
            .credit(user, Decimal::new(amount, 0), BalanceTarget::Deposit)
            .unwrap();
        user
    }

    /// Drive a battle to RESULT_PENDING with a 100 stake each.
    fn adjudicable_battle(
        board: &mut BattleBoard,
        ledger: &mut WalletLedger,
    ) -> (BattleId, UserId, UserId) {
        let creator = fund(ledger, 100);
        let opponent = fund(ledger, 100);
        let battle_id = board
            .create(ledger, creator, Decimal::new(100, 0), Decimal::TEN)
            .unwrap();
        board.accept(ledger, battle_id, opponent).unwrap();
        board.mark_ready(battle_id, creator).unwrap();
        board.mark_ready(battle_id, opponent).unwrap();
        board
            .submit_result(battle_id, creator, OutcomeClaim::Won, None)
            .unwrap();
        (battle_id, creator, opponent)
    }

    #[test]
    fn settle_pays_prize_and_updates_stats() {
        let mut board = BattleBoard::new();
        let mut ledger = WalletLedger::new();
        let mut referrals = ReferralRegistry::new();
        let (battle_id, creator, opponent) = adjudicable_battle(&mut board, &mut ledger);

        let outcome = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap();

        let ResolveOutcome::Settled(receipt) = outcome else {
            panic!("expected settlement");
        };
        assert_eq!(receipt.prize, Decimal::new(190, 0));
        assert_eq!(receipt.commission, Decimal::new(10, 0));
        assert_eq!(receipt.loser_id, opponent);

        let winner = ledger.account(creator).unwrap();
        assert_eq!(winner.winnings_balance, Decimal::new(190, 0));
        assert_eq!(winner.games_played, 1);
        assert_eq!(winner.games_won, 1);

        let loser = ledger.account(opponent).unwrap();
        assert!(loser.is_zero());
        assert_eq!(loser.games_played, 1);
        assert_eq!(loser.games_won, 0);

        let battle = board.battle(battle_id).unwrap();
        assert_eq!(battle.status, BattleStatus::Completed);
        assert_eq!(battle.winner_id, Some(creator));
        assert!(battle.completed_at.is_some());
    }

    #[test]
    fn second_resolve_is_noop_with_identical_balances() {
        let mut board = BattleBoard::new();
        let mut ledger = WalletLedger::new();
        let mut referrals = ReferralRegistry::new();
        let (battle_id, creator, opponent) = adjudicable_battle(&mut board, &mut ledger);

        engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap();
        let after_first = ledger.account(creator).unwrap().clone();

        // Same winner again.
        let outcome = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap();
        assert_eq!(outcome, ResolveOutcome::AlreadyTerminal);

        // Different winner: still a no-op, not a second payout.
        let outcome = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, opponent)
            .unwrap();
        assert_eq!(outcome, ResolveOutcome::AlreadyTerminal);

        assert_eq!(ledger.account(creator).unwrap(), &after_first);
        assert!(ledger.account(opponent).unwrap().is_zero());
    }

    #[test]
    fn invalid_winner_changes_nothing() {
        let mut board = BattleBoard::new();
        let mut ledger = WalletLedger::new();
        let mut referrals = ReferralRegistry::new();
        let (battle_id, creator, _) = adjudicable_battle(&mut board, &mut ledger);
        let outsider = fund(&mut ledger, 100);

        let err = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, outsider)
            .unwrap_err();
        assert!(matches!(err, StakeduelError::InvalidWinner { .. }));

        let battle = board.battle(battle_id).unwrap();
        assert_eq!(battle.status, BattleStatus::ResultPending);
        assert_eq!(ledger.account(creator).unwrap().winnings_balance, Decimal::ZERO);
    }

    #[test]
    fn resolve_before_result_pending_rejected() {
        let mut board = BattleBoard::new();
        let mut ledger = WalletLedger::new();
        let mut referrals = ReferralRegistry::new();
        let creator = fund(&mut ledger, 100);
        let opponent = fund(&mut ledger, 100);
        let battle_id = board
            .create(&mut ledger, creator, Decimal::new(100, 0), Decimal::TEN)
            .unwrap();

        // Open battle with no opponent can never be resolved.
        let err = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap_err();
        assert!(matches!(err, StakeduelError::NotResolvable { .. }));

        board.accept(&mut ledger, battle_id, opponent).unwrap();
        let err = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap_err();
        assert!(matches!(err, StakeduelError::NotResolvable { .. }));
    }

    #[test]
    fn first_game_fires_referral_bonus_for_both_players() {
        let mut board = BattleBoard::new();
        let mut ledger = WalletLedger::new();
        let mut referrals = ReferralRegistry::new();

        let referrer = fund(&mut ledger, 0);
        let (battle_id, creator, opponent) = adjudicable_battle(&mut board, &mut ledger);
        referrals.register(referrer, creator).unwrap();
        referrals.register(referrer, opponent).unwrap();

        let ResolveOutcome::Settled(receipt) = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap()
        else {
            panic!("expected settlement");
        };

        // Both players finished their first game; the referrer is paid once
        // per referred user.
        assert_eq!(receipt.bonuses.len(), 2);
        assert_eq!(
            ledger.account(referrer).unwrap().winnings_balance,
            Decimal::new(50, 0)
        );
    }

    #[test]
    fn resolve_pays_deactivated_referrer_and_commits_once() {
        let mut board = BattleBoard::new();
        let mut ledger = WalletLedger::new();
        let mut referrals = ReferralRegistry::new();

        let referrer = fund(&mut ledger, 0);
        let (battle_id, creator, opponent) = adjudicable_battle(&mut board, &mut ledger);
        referrals.register(referrer, creator).unwrap();
        ledger.deactivate(referrer).unwrap();

        // The bonus credit must not abort the settlement halfway: prize,
        // stats, bonus and the terminal transition land together.
        let ResolveOutcome::Settled(receipt) = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap()
        else {
            panic!("expected settlement");
        };
        assert_eq!(receipt.bonuses.len(), 1);
        assert_eq!(
            ledger.account(creator).unwrap().winnings_balance,
            Decimal::new(190, 0)
        );
        assert_eq!(ledger.account(creator).unwrap().games_played, 1);
        assert_eq!(ledger.account(opponent).unwrap().games_played, 1);
        assert_eq!(
            ledger.account(referrer).unwrap().winnings_balance,
            Decimal::new(25, 0)
        );
        assert_eq!(board.battle(battle_id).unwrap().status, BattleStatus::Completed);

        // A retry sees the terminal battle and pays nothing more.
        let outcome = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, battle_id, creator)
            .unwrap();
        assert_eq!(outcome, ResolveOutcome::AlreadyTerminal);
        assert_eq!(
            ledger.account(creator).unwrap().winnings_balance,
            Decimal::new(190, 0)
        );
        assert_eq!(ledger.account(creator).unwrap().games_played, 1);
    }

    #[test]
    fn veteran_players_fire_no_bonus() {
        let mut board = BattleBoard::new();
        let mut ledger = WalletLedger::new();
        let mut referrals = ReferralRegistry::new();

        let referrer = fund(&mut ledger, 0);
        let (first, creator, opponent) = adjudicable_battle(&mut board, &mut ledger);
        referrals.register(referrer, creator).unwrap();
        referrals.register(referrer, opponent).unwrap();
        engine()
            .resolve(&mut board, &mut ledger, &mut referrals, first, creator)
            .unwrap();

        // Second battle between the same players: games_played is now 1,
        // the trigger must not fire again.
        ledger
            .credit(creator, Decimal::new(100, 0), BalanceTarget::Deposit)
            .unwrap();
        ledger
            .credit(opponent, Decimal::new(100, 0), BalanceTarget::Deposit)
            .unwrap();
        let second = board
            .create(&mut ledger, creator, Decimal::new(100, 0), Decimal::TEN)
            .unwrap();
        board.accept(&mut ledger, second, opponent).unwrap();
        board.mark_ready(second, creator).unwrap();
        board.mark_ready(second, opponent).unwrap();
        board
            .submit_result(second, opponent, OutcomeClaim::Won, None)
            .unwrap();

        let ResolveOutcome::Settled(receipt) = engine()
            .resolve(&mut board, &mut ledger, &mut referrals, second, opponent)
            .unwrap()
        else {
            panic!("expected settlement");
        };
        assert!(receipt.bonuses.is_empty());
        assert_eq!(
            ledger.account(referrer).unwrap().winnings_balance,
            Decimal::new(50, 0)
        );
    }
}
