use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
/// Error codes for the pool contract. Common errors are codes that match up with the built-in
/// contracts error reporting. Pool specific errors start at 1200.
pub enum PoolError {
    // Common Errors
    InternalError = 1,
    AlreadyInitializedError = 3,

    UnauthorizedError = 4,

    NegativeAmountError = 8,
    BalanceError = 10,
    OverflowError = 12,

    // Pool Request Errors (start at 1200)
    BadRequest = 1200,
    InvalidPoolInitArgs = 1201,
    InvalidReserveMetadata = 1202,
    InvalidAmount = 1203,
    ReserveNotFound = 1204,
    ReserveInactive = 1205,
    ReserveFrozen = 1206,
    BorrowNotEnabled = 1207,
    PoolPaused = 1208,

    // Position State Errors
    InvalidHf = 1209,
    InsufficientCollateral = 1210,
    HealthFactorNotBelowThreshold = 1211,
    NoDebtOfSelectedType = 1212,
    CollateralCannotBeLiquidated = 1213,

    // Oracle Errors
    StalePrice = 1214,
    PriceNotAvailable = 1215,

    // Liquidity Errors
    InsufficientLiquidity = 1216,
    ReserveLocked = 1217,
    FarmingNotConfigured = 1218,
}
