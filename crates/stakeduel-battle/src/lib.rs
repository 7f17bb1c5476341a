//! # stakeduel-battle
//!
//! The battle lifecycle plane: [`BattleBoard`] holds every battle and
//! implements the non-terminal operations (create, accept, readiness,
//! result claims). Terminal transitions — settlement and cancellation —
//! live in `stakeduel-settlement` because they move escrowed funds.

pub mod board;

pub use board::BattleBoard;
