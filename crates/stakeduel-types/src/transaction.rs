//! Deposit / withdrawal transaction records.
//!
//! A transaction is an externally-proven money movement between a user's
//! bank/UPI world and their StakeDuel wallet. The record's status moves
//! `pending -> completed` or `pending -> rejected`, each exactly once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// Direction of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// External money in; credits the deposit balance once verified.
    Deposit,
    /// Winnings out; the amount is reserved (debited) at request time.
    Withdrawal,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

/// Verification status of the transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected { reason: String },
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Rejected { .. } => write!(f, "REJECTED"),
        }
    }
}

/// A single deposit or withdrawal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub status: TransactionStatus,
    /// Opaque reference to the external proof (payment screenshot, UTR
    /// number). Stored, never interpreted.
    pub proof_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a pending record.
    #[must_use]
    pub fn pending(
        user_id: UserId,
        kind: TransactionKind,
        amount: Decimal,
        proof_ref: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            kind,
            amount,
            status: TransactionStatus::Pending,
            proof_ref,
            created_at: Utc::now(),
            processed_at: None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}
