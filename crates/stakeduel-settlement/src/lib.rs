//! # stakeduel-settlement
//!
//! The terminal plane of the wagering core: every path that releases
//! escrowed funds back to accounts lives here.
//!
//! - [`SettlementEngine`] — payout of a completed battle: commission,
//!   prize credit, stat updates, referral triggers
//! - [`CancellationEngine`] — refunds, with the penalty split when an
//!   opponent had already joined
//! - [`ReferralRegistry`] — one-time first-game bonus
//! - [`TransactionLedger`] — externally-proven deposits and withdrawals
//! - [`WagerEngine`] — the assembled engine behind one call surface

pub mod cancel;
pub mod engine;
pub mod referral_bonus;
pub mod settle;
pub mod transactions;

pub use cancel::{CancelOutcome, CancellationEngine, CancellationReceipt};
pub use engine::WagerEngine;
pub use referral_bonus::{ReferralBonusPayout, ReferralRegistry};
pub use settle::{ResolveOutcome, SettlementEngine, SettlementReceipt};
pub use transactions::{ProcessOutcome, TransactionLedger};
