//! # stakeduel-types
//!
//! Shared types, errors, and configuration for the **StakeDuel** wagering core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`BattleId`], [`TransactionId`], [`ReferralId`]
//! - **Account model**: [`Account`], [`BalanceTarget`], [`ReferralCode`]
//! - **Battle model**: [`Battle`], [`BattleStatus`], [`OutcomeClaim`], [`ResultClaim`]
//! - **Transaction model**: [`Transaction`], [`TransactionKind`], [`TransactionStatus`]
//! - **Referral model**: [`Referral`], [`ReferralStatus`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`StakeduelError`] with `SD_ERR_` prefix codes
//! - **Constants**: commission, penalty, and bonus defaults

pub mod account;
pub mod battle;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod referral;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use stakeduel_types::{Battle, BattleStatus, Account, ...};

pub use account::*;
pub use battle::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use referral::*;
pub use transaction::*;

// Constants are accessed via `stakeduel_types::constants::FOO`
// (not re-exported to avoid name collisions).
