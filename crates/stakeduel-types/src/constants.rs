//! System-wide constants for the StakeDuel wagering core.

/// Default platform commission on the combined pot, in basis points (5%).
pub const DEFAULT_COMMISSION_RATE_BPS: u32 = 500;

/// Default flat penalty charged to the cancelling party when an opponent
/// has already joined, in whole currency units.
pub const DEFAULT_CANCELLATION_PENALTY: u32 = 5;

/// Default one-time referral bonus, in whole currency units.
pub const DEFAULT_REFERRAL_BONUS: u32 = 25;

/// Default minimum stake per player, in whole currency units.
pub const DEFAULT_MIN_STAKE: u32 = 10;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "StakeDuel";
