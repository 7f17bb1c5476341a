//! # stakeduel-ledger
//!
//! The wallet ledger plane: account store, the two balance-mutation
//! primitives ([`WalletLedger::debit`] / [`WalletLedger::credit`]), game
//! stat increments, and the [`FloatConservation`] safety net.
//!
//! No other crate in the workspace mutates an account balance directly.

pub mod conservation;
pub mod wallet;

pub use conservation::FloatConservation;
pub use wallet::WalletLedger;
