//! Battle model and the lifecycle state machine.
//!
//! A battle's status is a closed enum with a single transition table
//! ([`BattleStatus::can_transition`]). Every write path checks the table (or
//! an equivalent status precondition) before mutating, so no transition
//! outside the enumerated set can ever be committed.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BattleId, UserId};

/// Lifecycle status of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum BattleStatus {
    /// Created and staked by the creator; waiting for an opponent.
    Open,
    /// Opponent joined and staked; waiting for both ready signals.
    WaitingForPlayersReady,
    /// Both players ready; the external game is being played.
    InProgress,
    /// At least one result claim submitted; awaiting adjudication.
    ResultPending,
    /// Terminal: adjudicated, prize paid out.
    Completed,
    /// Terminal: stakes refunded (penalty applied if an opponent had joined).
    Cancelled,
}

impl BattleStatus {
    /// Whether this is one of the two terminal states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The single source of truth for legal lifecycle transitions.
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        use BattleStatus::{
            Cancelled, Completed, InProgress, Open, ResultPending, WaitingForPlayersReady,
        };
        matches!(
            (self, to),
            (Open, WaitingForPlayersReady)
                | (Open | WaitingForPlayersReady, Cancelled)
                | (WaitingForPlayersReady, InProgress)
                | (InProgress | ResultPending, ResultPending)
                | (ResultPending, Completed)
        )
    }
}

impl std::fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::WaitingForPlayersReady => write!(f, "WAITING_FOR_PLAYERS_READY"),
            Self::InProgress => write!(f, "INPROGRESS"),
            Self::ResultPending => write!(f, "RESULT_PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A player's claimed outcome for the external game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeClaim {
    Won,
    Lost,
}

/// A result submission from one participant. Does not by itself determine
/// the winner; adjudication is administrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultClaim {
    pub claim: OutcomeClaim,
    /// Opaque reference to externally stored proof (screenshot URL etc.).
    pub proof_ref: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A single 1-v-1 wager.
///
/// Exactly one stake debit occurs per participant (creator at creation,
/// opponent at acceptance) and exactly one terminal financial event per
/// battle (payout at resolve, or refund at cancel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub id: BattleId,
    /// Stake per player. Always > 0.
    pub amount: Decimal,
    pub creator_id: UserId,
    pub opponent_id: Option<UserId>,
    pub status: BattleStatus,
    pub winner_id: Option<UserId>,
    /// Participants who have signalled readiness.
    pub ready_players: BTreeSet<UserId>,
    /// Result claims keyed by submitter; resubmission overwrites.
    pub result_claims: BTreeMap<UserId, ResultClaim>,
    /// Bumped on every committed write. The optimistic precondition for
    /// read-modify-write against the external store.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Battle {
    /// Create a battle in the OPEN state. The caller is responsible for
    /// debiting the creator's stake in the same atomic unit.
    #[must_use]
    pub fn new(creator_id: UserId, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: BattleId::new(),
            amount,
            creator_id,
            opponent_id: None,
            status: BattleStatus::Open,
            winner_id: None,
            ready_players: BTreeSet::new(),
            result_claims: BTreeMap::new(),
            version: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Both participants, once an opponent has joined.
    #[must_use]
    pub fn participants(&self) -> Option<(UserId, UserId)> {
        self.opponent_id.map(|opp| (self.creator_id, opp))
    }

    /// Whether `user_id` is the creator or the joined opponent.
    #[must_use]
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.creator_id == user_id || self.opponent_id == Some(user_id)
    }

    /// Given one participant, the other one.
    #[must_use]
    pub fn other_participant(&self, user_id: UserId) -> Option<UserId> {
        let (creator, opponent) = self.participants()?;
        if user_id == creator {
            Some(opponent)
        } else if user_id == opponent {
            Some(creator)
        } else {
            None
        }
    }

    /// Apply a status change and bump the version. Callers must have
    /// verified the transition is legal.
    pub fn advance(&mut self, to: BattleStatus) {
        debug_assert!(self.status.can_transition(to), "illegal {} -> {to}", self.status);
        self.status = to;
        self.touch();
    }

    /// Bump version and updated_at after any committed write.
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BattleStatus::{
        Cancelled, Completed, InProgress, Open, ResultPending, WaitingForPlayersReady,
    };

    #[test]
    fn transition_table_allows_happy_path() {
        assert!(Open.can_transition(WaitingForPlayersReady));
        assert!(WaitingForPlayersReady.can_transition(InProgress));
        assert!(InProgress.can_transition(ResultPending));
        assert!(ResultPending.can_transition(ResultPending)); // second claim
        assert!(ResultPending.can_transition(Completed));
    }

    #[test]
    fn transition_table_allows_cancellation_paths() {
        assert!(Open.can_transition(Cancelled));
        assert!(WaitingForPlayersReady.can_transition(Cancelled));
    }

    #[test]
    fn transition_table_rejects_everything_else() {
        // Terminal states are final.
        for term in [Completed, Cancelled] {
            for to in [
                Open,
                WaitingForPlayersReady,
                InProgress,
                ResultPending,
                Completed,
                Cancelled,
            ] {
                assert!(!term.can_transition(to), "{term} -> {to} must be illegal");
            }
        }
        // No skipping the readiness handshake or re-opening.
        assert!(!Open.can_transition(InProgress));
        assert!(!Open.can_transition(ResultPending));
        assert!(!Open.can_transition(Completed));
        assert!(!InProgress.can_transition(Cancelled));
        assert!(!ResultPending.can_transition(Cancelled));
        assert!(!InProgress.can_transition(Completed));
        assert!(!WaitingForPlayersReady.can_transition(Open));
    }

    #[test]
    fn is_terminal() {
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Open.is_terminal());
        assert!(!ResultPending.is_terminal());
    }

    #[test]
    fn new_battle_is_open_with_no_opponent() {
        let creator = UserId::new();
        let battle = Battle::new(creator, Decimal::new(100, 0));
        assert_eq!(battle.status, Open);
        assert_eq!(battle.opponent_id, None);
        assert_eq!(battle.participants(), None);
        assert!(battle.is_participant(creator));
        assert_eq!(battle.version, 0);
    }

    #[test]
    fn other_participant_resolves_both_ways() {
        let creator = UserId::new();
        let opponent = UserId::new();
        let mut battle = Battle::new(creator, Decimal::ONE);
        battle.opponent_id = Some(opponent);

        assert_eq!(battle.other_participant(creator), Some(opponent));
        assert_eq!(battle.other_participant(opponent), Some(creator));
        assert_eq!(battle.other_participant(UserId::new()), None);
    }

    #[test]
    fn advance_bumps_version() {
        let mut battle = Battle::new(UserId::new(), Decimal::ONE);
        battle.opponent_id = Some(UserId::new());
        battle.advance(WaitingForPlayersReady);
        assert_eq!(battle.status, WaitingForPlayersReady);
        assert_eq!(battle.version, 1);
    }
}
