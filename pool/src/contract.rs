use crate::{
    pool::{self, AccountData, Positions, Reserve},
    storage::{self, FarmingConfig, PoolConfig, ReserveConfig, ReserveInit, ReserveKey},
};
use soroban_sdk::{contract, contractclient, contractimpl, Address, Env, Symbol, Vec};

/// ### Pool
///
/// An isolated lending pool
#[contract]
pub struct PoolContract;

#[contractclient(name = "PoolClient")]
pub trait LendingPool {
    /// Initialize the pool
    ///
    /// ### Arguments
    /// * `admin` - The Address for the admin
    /// * `name` - The name of the pool
    /// * `oracle` - The contract address of the default price feed
    /// * `treasury` - The recipient of the reserve factor share of interest
    ///
    /// ### Panics
    /// If the pool is already initialized
    fn initialize(e: Env, admin: Address, name: Symbol, oracle: Address, treasury: Address);

    /// (Admin only) Set a new address as the admin of this pool
    ///
    /// ### Arguments
    /// * `new_admin` - The new admin address
    fn set_admin(e: Env, new_admin: Address);

    /// (Admin only) Add a set of new reserves to the pool
    ///
    /// Returns the indexes of the new reserves
    ///
    /// ### Arguments
    /// * `reserves` - The reserves and their initial configurations
    ///
    /// ### Panics
    /// If a reserve already exists or its metadata is invalid
    fn init_reserves(e: Env, reserves: Vec<ReserveInit>) -> Vec<u32>;

    /// (Admin only) Update a reserve's configuration
    ///
    /// ### Arguments
    /// * `key` - The reserve key
    /// * `metadata` - The new configuration for the reserve
    ///
    /// ### Panics
    /// If the reserve does not exist or the metadata is invalid
    fn update_reserve(e: Env, key: ReserveKey, metadata: ReserveConfig);

    /// (Admin only) Pause or unpause ledger-changing pool operations
    ///
    /// ### Arguments
    /// * `paused` - Whether the pool is paused
    fn set_pause(e: Env, paused: bool);

    /// (Admin only) Set a price feed override for an asset. The feed must
    /// quote with the same decimals as the pool's default price feed.
    ///
    /// ### Arguments
    /// * `asset` - The contract address of the asset
    /// * `source` - The price feed to use for the asset
    ///
    /// ### Panics
    /// If the feed's decimals do not match the default price feed's
    fn set_price_source(e: Env, asset: Address, source: Address);

    /// (Admin only) Set the fallback price feed for the pool. The feed must
    /// quote with the same decimals as the pool's default price feed.
    ///
    /// ### Arguments
    /// * `oracle` - The contract address of the fallback price feed
    ///
    /// ### Panics
    /// If the feed's decimals do not match the default price feed's
    fn set_fallback_oracle(e: Env, oracle: Address);

    /// (Admin only) Set the rehypothecation configuration for a reserve
    ///
    /// ### Arguments
    /// * `key` - The reserve key
    /// * `config` - The rehypothecation configuration
    ///
    /// ### Panics
    /// If the reserve does not exist or the config is invalid
    fn set_farming_config(e: Env, key: ReserveKey, config: FarmingConfig);

    /// (Admin only) Pay out the treasury's accrued share of a reserve's
    /// interest to the treasury address
    ///
    /// Returns the underlying tokens paid out
    ///
    /// ### Arguments
    /// * `key` - The reserve key
    fn claim_treasury(e: Env, key: ReserveKey) -> i128;

    /// Deposit "amount" of the reserve's underlying tokens from "from" into
    /// the pool, crediting the supply position to "on_behalf_of"
    ///
    /// Returns the scaled supply balance minted
    ///
    /// ### Arguments
    /// * `from` - The address funding the deposit
    /// * `key` - The reserve key
    /// * `amount` - The amount of underlying tokens to deposit
    /// * `on_behalf_of` - The address credited with the position
    ///
    /// ### Panics
    /// If the deposit cannot be completed
    fn deposit(e: Env, from: Address, key: ReserveKey, amount: i128, on_behalf_of: Address)
        -> i128;

    /// Withdraw "amount" of the reserve's underlying tokens from "from"'s
    /// supply position, sending them to "to". An amount of i128::MAX
    /// withdraws the full balance.
    ///
    /// Returns the underlying tokens withdrawn
    ///
    /// ### Arguments
    /// * `from` - The address owning the position
    /// * `key` - The reserve key
    /// * `amount` - The amount of underlying tokens to withdraw
    /// * `to` - The recipient of the underlying tokens
    ///
    /// ### Panics
    /// If the withdraw cannot be completed or leaves "from" unhealthy
    fn withdraw(e: Env, from: Address, key: ReserveKey, amount: i128, to: Address) -> i128;

    /// Borrow "amount" of the reserve's underlying tokens against "from"'s
    /// collateral
    ///
    /// Returns the scaled debt balance minted
    ///
    /// ### Arguments
    /// * `from` - The borrower
    /// * `key` - The reserve key
    /// * `amount` - The amount of underlying tokens to borrow
    ///
    /// ### Panics
    /// If the borrow cannot be completed or exceeds "from"'s borrowing power
    fn borrow(e: Env, from: Address, key: ReserveKey, amount: i128) -> i128;

    /// Repay "amount" of "on_behalf_of"'s debt against the reserve with
    /// underlying tokens from "from". An amount of i128::MAX repays the full
    /// balance.
    ///
    /// Returns the underlying tokens repaid
    ///
    /// ### Arguments
    /// * `from` - The address funding the repayment
    /// * `key` - The reserve key
    /// * `amount` - The amount of underlying tokens to repay
    /// * `on_behalf_of` - The address whose debt is repaid
    ///
    /// ### Panics
    /// If the repayment cannot be completed
    fn repay(e: Env, from: Address, key: ReserveKey, amount: i128, on_behalf_of: Address) -> i128;

    /// Transfer "amount" of "from"'s scaled supply balance in the reserve to
    /// "to". An amount of i128::MAX transfers the full balance. Underlying
    /// tokens stay in the pool, only the claim on them moves.
    ///
    /// Returns the scaled supply balance transferred
    ///
    /// ### Arguments
    /// * `from` - The address owning the position
    /// * `key` - The reserve key
    /// * `amount` - The amount of scaled supply balance to transfer
    /// * `to` - The recipient of the balance
    ///
    /// ### Panics
    /// If the transfer cannot be completed or leaves "from" unhealthy
    fn transfer_supply(e: Env, from: Address, key: ReserveKey, amount: i128, to: Address) -> i128;

    /// Toggle whether "from"'s supply of the reserve backs their debt
    ///
    /// ### Arguments
    /// * `from` - The address owning the position
    /// * `key` - The reserve key
    /// * `enable` - Whether the supply backs debt
    ///
    /// ### Panics
    /// If the toggle cannot be completed or leaves "from" unhealthy
    fn set_collateral(e: Env, from: Address, key: ReserveKey, enable: bool);

    /// Liquidate an unhealthy user. The liquidator repays up to the close
    /// factor of the user's debt against "debt_key" and seizes a
    /// bonus-weighted amount of collateral from "collateral_key".
    ///
    /// Returns (debt repaid, collateral seized), in underlying tokens
    ///
    /// ### Arguments
    /// * `liquidator` - The address funding the liquidation
    /// * `user` - The address being liquidated
    /// * `collateral_key` - The reserve key of the collateral to seize
    /// * `debt_key` - The reserve key of the debt to repay
    /// * `debt_to_cover` - The amount of debt to repay, in underlying tokens
    /// * `receive_collateral_tokens` - Whether the liquidator receives the
    ///   seized collateral as a supply position instead of underlying tokens
    ///
    /// ### Panics
    /// If the liquidation cannot be completed
    fn liquidation_call(
        e: Env,
        liquidator: Address,
        user: Address,
        collateral_key: ReserveKey,
        debt_key: ReserveKey,
        debt_to_cover: i128,
        receive_collateral_tokens: bool,
    ) -> (i128, i128);

    /// Flash loan "amount" of the reserve's underlying tokens to "receiver".
    /// The receiver must return the loan plus the premium before its
    /// callback completes.
    ///
    /// Returns the premium charged
    ///
    /// ### Arguments
    /// * `from` - The address initiating the loan
    /// * `receiver` - The contract receiving the loan callback
    /// * `key` - The reserve key
    /// * `amount` - The amount of underlying tokens to loan
    ///
    /// ### Panics
    /// If the loan cannot be funded or is not repaid in full
    fn flash_loan(e: Env, from: Address, receiver: Address, key: ReserveKey, amount: i128)
        -> i128;

    /// Rebalance the reserve's liquidity against its yield vault, claiming
    /// any realized profit along the way. Callable by anyone, including
    /// while the pool is paused.
    ///
    /// ### Arguments
    /// * `key` - The reserve key
    ///
    /// ### Panics
    /// If the reserve has no rehypothecation config
    fn rebalance(e: Env, key: ReserveKey);

    /// Fetch the positions for an address
    ///
    /// ### Arguments
    /// * `address` - The address to fetch positions for
    fn get_positions(e: Env, address: Address) -> Positions;

    /// Fetch the reserve, accrued to the current ledger timestamp
    ///
    /// ### Arguments
    /// * `key` - The reserve key
    ///
    /// ### Panics
    /// If the reserve does not exist
    fn get_reserve(e: Env, key: ReserveKey) -> Reserve;

    /// Fetch an account level summary of an address's positions, denominated
    /// in the oracle's base asset
    ///
    /// ### Arguments
    /// * `address` - The address to summarize
    fn get_user_account_data(e: Env, address: Address) -> AccountData;

    /// Fetch the underlying tokens the reserve manages, held directly or
    /// farmed
    ///
    /// ### Arguments
    /// * `key` - The reserve key
    fn get_total_managed_assets(e: Env, key: ReserveKey) -> i128;
}

#[contractimpl]
impl LendingPool for PoolContract {
    fn initialize(e: Env, admin: Address, name: Symbol, oracle: Address, treasury: Address) {
        storage::extend_instance(&e);
        admin.require_auth();

        pool::execute_initialize(&e, &admin, &name, &oracle, &treasury);
    }

    fn set_admin(e: Env, new_admin: Address) {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        storage::set_admin(&e, &new_admin);

        e.events()
            .publish((Symbol::new(&e, "set_admin"), admin), new_admin);
    }

    fn init_reserves(e: Env, reserves: Vec<ReserveInit>) -> Vec<u32> {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        let indexes = pool::execute_init_reserves(&e, &reserves);

        for init in reserves.iter() {
            e.events().publish(
                (Symbol::new(&e, "init_reserve"), init.key.asset.clone()),
                init.key.reserve_type,
            );
        }
        indexes
    }

    fn update_reserve(e: Env, key: ReserveKey, metadata: ReserveConfig) {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        pool::execute_update_reserve(&e, &key, &metadata);

        e.events().publish(
            (Symbol::new(&e, "update_reserve"), key.asset),
            key.reserve_type,
        );
    }

    fn set_pause(e: Env, paused: bool) {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        pool::execute_set_pause(&e, paused);

        e.events()
            .publish((Symbol::new(&e, "set_pause"), admin), paused);
    }

    fn set_price_source(e: Env, asset: Address, source: Address) {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        pool::execute_set_price_source(&e, &asset, &source);

        e.events()
            .publish((Symbol::new(&e, "set_price_source"), asset), source);
    }

    fn set_fallback_oracle(e: Env, oracle: Address) {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        pool::execute_set_fallback_oracle(&e, &oracle);

        e.events()
            .publish((Symbol::new(&e, "set_fallback_oracle"), admin), oracle);
    }

    fn set_farming_config(e: Env, key: ReserveKey, config: FarmingConfig) {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        pool::execute_set_farming_config(&e, &key, &config);
    }

    fn claim_treasury(e: Env, key: ReserveKey) -> i128 {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        pool::execute_claim_treasury(&e, &key)
    }

    fn deposit(
        e: Env,
        from: Address,
        key: ReserveKey,
        amount: i128,
        on_behalf_of: Address,
    ) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_deposit(&e, &from, &key, amount, &on_behalf_of)
    }

    fn withdraw(e: Env, from: Address, key: ReserveKey, amount: i128, to: Address) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_withdraw(&e, &from, &key, amount, &to)
    }

    fn borrow(e: Env, from: Address, key: ReserveKey, amount: i128) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_borrow(&e, &from, &key, amount)
    }

    fn repay(e: Env, from: Address, key: ReserveKey, amount: i128, on_behalf_of: Address) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_repay(&e, &from, &key, amount, &on_behalf_of)
    }

    fn transfer_supply(e: Env, from: Address, key: ReserveKey, amount: i128, to: Address) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_transfer_supply(&e, &from, &key, amount, &to)
    }

    fn set_collateral(e: Env, from: Address, key: ReserveKey, enable: bool) {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_set_collateral(&e, &from, &key, enable);
    }

    fn liquidation_call(
        e: Env,
        liquidator: Address,
        user: Address,
        collateral_key: ReserveKey,
        debt_key: ReserveKey,
        debt_to_cover: i128,
        receive_collateral_tokens: bool,
    ) -> (i128, i128) {
        storage::extend_instance(&e);
        liquidator.require_auth();

        pool::execute_liquidation(
            &e,
            &liquidator,
            &user,
            &collateral_key,
            &debt_key,
            debt_to_cover,
            receive_collateral_tokens,
        )
    }

    fn flash_loan(
        e: Env,
        from: Address,
        receiver: Address,
        key: ReserveKey,
        amount: i128,
    ) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_flash_loan(&e, &from, &receiver, &key, amount)
    }

    fn rebalance(e: Env, key: ReserveKey) {
        storage::extend_instance(&e);

        pool::execute_rebalance(&e, &key);
    }

    fn get_positions(e: Env, address: Address) -> Positions {
        storage::get_user_positions(&e, &address)
    }

    fn get_reserve(e: Env, key: ReserveKey) -> Reserve {
        pool::Reserve::load(&e, &key)
    }

    fn get_user_account_data(e: Env, address: Address) -> AccountData {
        let mut pool = pool::Pool::load(&e);
        let positions = storage::get_user_positions(&e, &address);
        let position_data = pool::PositionData::calculate_from_positions(&e, &mut pool, &positions);
        position_data.to_account_data(&e)
    }

    fn get_total_managed_assets(e: Env, key: ReserveKey) -> i128 {
        pool::total_managed_assets(&e, &key)
    }
}
