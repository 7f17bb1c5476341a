//! Referral pairing records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ReferralId, UserId};

/// Status of a referral pairing. At most one transition, `Pending ->
/// Completed`, when the referred user finishes their first game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferralStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A referrer/referred pairing created at the referred user's signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    pub referrer_id: UserId,
    pub referred_id: UserId,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Referral {
    #[must_use]
    pub fn pending(referrer_id: UserId, referred_id: UserId) -> Self {
        Self {
            id: ReferralId::new(),
            referrer_id,
            referred_id,
            status: ReferralStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}
