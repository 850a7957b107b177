use soroban_sdk::{contractclient, Address, Env};

/// A yield source the pool can place idle reserve liquidity into.
///
/// Deposits are pushed: the pool transfers the underlying to the vault before
/// calling `deposit`, so no token allowance is required.
#[contractclient(name = "YieldVaultClient")]
pub trait YieldVault {
    /// Record a deposit of `amount` underlying for `from`. The tokens must
    /// already be held by the vault.
    ///
    /// Returns the amount credited.
    fn deposit(e: Env, from: Address, amount: i128) -> i128;

    /// Withdraw `amount` underlying from `to`'s balance and transfer it to `to`.
    ///
    /// Returns the amount withdrawn.
    fn withdraw(e: Env, to: Address, amount: i128) -> i128;

    /// The maximum amount of underlying `owner` can currently withdraw
    fn max_withdraw(e: Env, owner: Address) -> i128;

    /// The amount of underlying currently credited to `owner`, including
    /// accrued yield
    fn assets_of(e: Env, owner: Address) -> i128;

    /// The total amount of underlying held by the vault
    fn total_assets(e: Env) -> i128;
}

/// The receiver side of a flash loan.
#[contractclient(name = "FlashLoanReceiverClient")]
pub trait FlashLoanReceiver {
    /// Execute an operation with the loaned tokens. The receiver must transfer
    /// at least `amount + premium` of `asset` back to the pool before this
    /// call returns.
    ///
    /// ### Arguments
    /// * `caller` - The address that initiated the flash loan
    /// * `asset` - The asset that was loaned
    /// * `amount` - The amount that was loaned
    /// * `premium` - The fee owed on top of the loaned amount
    fn exec_op(e: Env, caller: Address, asset: Address, amount: i128, premium: i128);
}
