//! Error types for the StakeDuel wagering core.
//!
//! All errors use the `SD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Battle lifecycle errors
//! - 2xx: Balance / wallet errors
//! - 3xx: Settlement / cancellation errors
//! - 4xx: Transaction (deposit/withdrawal) errors
//! - 5xx: Referral errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{BattleId, BattleStatus, ReferralId, TransactionId, UserId};

/// Central error enum for all StakeDuel operations.
#[derive(Debug, Error)]
pub enum StakeduelError {
    // =================================================================
    // Battle Lifecycle Errors (1xx)
    // =================================================================
    /// The requested battle does not exist.
    #[error("SD_ERR_100: Battle not found: {0}")]
    BattleNotFound(BattleId),

    /// The stake amount failed validation (non-positive or below minimum).
    #[error("SD_ERR_101: Invalid stake: {reason}")]
    InvalidStake { reason: String },

    /// The battle is no longer open for acceptance (already accepted,
    /// cancelled, or otherwise past the OPEN state).
    #[error("SD_ERR_102: Battle {battle_id} is not open: status is {status}")]
    BattleNotOpen {
        battle_id: BattleId,
        status: BattleStatus,
    },

    /// A creator tried to accept their own battle.
    #[error("SD_ERR_103: Cannot accept own battle: {0}")]
    SelfAccept(BattleId),

    /// The caller is not one of the two battle participants.
    #[error("SD_ERR_104: User {user_id} is not a participant in battle {battle_id}")]
    NotAParticipant {
        battle_id: BattleId,
        user_id: UserId,
    },

    /// A lifecycle operation was attempted from a state that does not
    /// permit it (e.g. marking ready before an opponent has joined).
    #[error("SD_ERR_105: Invalid transition for battle {battle_id}: {status} -> {requested}")]
    InvalidTransition {
        battle_id: BattleId,
        status: BattleStatus,
        requested: BattleStatus,
    },

    // =================================================================
    // Balance / Wallet Errors (2xx)
    // =================================================================
    /// Not enough combined balance (deposit + winnings) for the operation.
    #[error("SD_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A balance operation would produce a negative value.
    #[error("SD_ERR_201: Balance underflow")]
    BalanceUnderflow,

    /// The account does not exist in the ledger.
    #[error("SD_ERR_202: Account not found: {0}")]
    AccountNotFound(UserId),

    /// The account has been deactivated and cannot transact.
    #[error("SD_ERR_203: Account deactivated: {0}")]
    AccountDeactivated(UserId),

    /// User float no longer matches the sum of account balances —
    /// critical safety alert.
    #[error("SD_ERR_204: Float conservation violation: {reason}")]
    FloatConservationViolation { reason: String },

    // =================================================================
    // Settlement / Cancellation Errors (3xx)
    // =================================================================
    /// The designated winner is not one of the two participants.
    #[error("SD_ERR_300: Invalid winner {winner_id} for battle {battle_id}")]
    InvalidWinner {
        battle_id: BattleId,
        winner_id: UserId,
    },

    /// The battle is not awaiting adjudication (no result submitted, or
    /// no opponent ever joined).
    #[error("SD_ERR_301: Battle {battle_id} is not resolvable: status is {status}")]
    NotResolvable {
        battle_id: BattleId,
        status: BattleStatus,
    },

    /// The battle has progressed past the point where cancellation is
    /// allowed (already in progress or awaiting adjudication).
    #[error("SD_ERR_302: Battle {battle_id} is not cancellable: status is {status}")]
    NotCancellable {
        battle_id: BattleId,
        status: BattleStatus,
    },

    // =================================================================
    // Transaction Errors (4xx)
    // =================================================================
    /// The transaction record does not exist.
    #[error("SD_ERR_400: Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The transaction was already rejected; it cannot be completed.
    #[error("SD_ERR_401: Transaction {0} was already rejected")]
    TransactionRejected(TransactionId),

    /// The transaction was already completed; it cannot be rejected.
    #[error("SD_ERR_402: Transaction {0} was already completed")]
    TransactionCompleted(TransactionId),

    /// A deposit verification was attempted on a withdrawal record, or
    /// vice versa.
    #[error("SD_ERR_403: Transaction {tx_id} has wrong kind: expected {expected}")]
    WrongTransactionKind {
        tx_id: TransactionId,
        expected: &'static str,
    },

    // =================================================================
    // Referral Errors (5xx)
    // =================================================================
    /// The referral record does not exist.
    #[error("SD_ERR_500: Referral not found: {0}")]
    ReferralNotFound(ReferralId),

    /// The referred user already has a referral registered.
    #[error("SD_ERR_501: User {0} already has a registered referral")]
    DuplicateReferral(UserId),

    /// A user tried to refer themselves.
    #[error("SD_ERR_502: Self-referral blocked for user {0}")]
    SelfReferral(UserId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SD_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid rates, negative fees, etc.).
    #[error("SD_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, StakeduelError>;
