/// 1 with 27 decimal places. The scalar for interest indices and rates.
pub const RAY: i128 = 1_000_000_000_000_000_000_000_000_000;

/// 1 with 18 decimal places. The scalar for health factors.
pub const WAD: i128 = 1_000_000_000_000_000_000;

/// 100% expressed in basis points
pub const SCALAR_BPS: i128 = 1_0000;

/// Seconds in a 365 day year
pub const SECONDS_PER_YEAR: i128 = 31_536_000;

/// The maximum portion of a position's debt that a single liquidation can
/// repay, in basis points
pub const CLOSE_FACTOR: i128 = 0_5000;

/// The fee charged on the loaned amount of a flash loan, in basis points
pub const FLASH_LOAN_PREMIUM: i128 = 9;

/// The maximum age of an oracle price before it is considered stale, in seconds
pub const MAX_PRICE_AGE: u64 = 24 * 60 * 60;
