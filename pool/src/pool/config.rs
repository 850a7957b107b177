use sep_40_oracle::PriceFeedClient;
use soroban_sdk::{panic_with_error, vec, Address, Env, Symbol, Vec};

use crate::{
    constants::RAY,
    errors::PoolError,
    storage::{self, PoolConfig, ReserveConfig, ReserveData, ReserveInit, ReserveKey},
};

use super::reserve::Reserve;

/// Initialize the pool
///
/// Panics if the pool is already initialized or the arguments are invalid
pub fn execute_initialize(
    e: &Env,
    admin: &Address,
    name: &Symbol,
    oracle: &Address,
    treasury: &Address,
) {
    if storage::has_admin(e) {
        panic_with_error!(e, PoolError::AlreadyInitializedError);
    }

    storage::set_admin(e, admin);
    storage::set_name(e, name);
    storage::set_pool_config(
        e,
        &PoolConfig {
            oracle: oracle.clone(),
            treasury: treasury.clone(),
            paused: false,
        },
    );
}

/// Execute the batched initialization of a set of reserves
///
/// Panics if a reserve already exists or its metadata is invalid
pub fn execute_init_reserves(e: &Env, reserves: &Vec<ReserveInit>) -> Vec<u32> {
    let mut indexes = vec![e];
    for init in reserves.iter() {
        if storage::has_res(e, &init.key) {
            panic_with_error!(e, PoolError::BadRequest);
        }
        require_valid_reserve_metadata(e, &init.metadata);

        let index = storage::push_res_list(e, &init.key);
        let mut reserve_config = init.metadata.clone();
        reserve_config.index = index;
        storage::set_res_config(e, &init.key, &reserve_config);

        let init_data = ReserveData {
            liquidity_index: RAY,
            borrow_index: RAY,
            liquidity_rate: 0,
            borrow_rate: 0,
            b_supply: 0,
            d_supply: 0,
            treasury_supply: 0,
            underlying_bal: 0,
            farming_bal: 0,
            last_time: e.ledger().timestamp(),
        };
        storage::set_res_data(e, &init.key, &init_data);
        indexes.push_back(index);
    }
    indexes
}

/// Update a reserve's configuration
///
/// Panics if the reserve does not exist or the new metadata is invalid
pub fn execute_update_reserve(e: &Env, key: &ReserveKey, metadata: &ReserveConfig) {
    if !storage::has_res(e, key) {
        panic_with_error!(e, PoolError::ReserveNotFound);
    }
    require_valid_reserve_metadata(e, metadata);

    // accrue interest against the old configuration before it is swapped out
    let reserve = Reserve::load(e, key);
    reserve.store(e);

    let old_config = storage::get_res_config(e, key);
    if old_config.decimals != metadata.decimals {
        panic_with_error!(e, PoolError::InvalidReserveMetadata);
    }

    let mut new_config = metadata.clone();
    new_config.index = old_config.index;
    storage::set_res_config(e, key, &new_config);
}

/// Pause or unpause ledger-changing pool operations
pub fn execute_set_pause(e: &Env, paused: bool) {
    let mut pool_config = storage::get_pool_config(e);
    pool_config.paused = paused;
    storage::set_pool_config(e, &pool_config);
}

/// Set a price feed override for an asset
///
/// Panics if the feed's decimals do not match the default feed's
pub fn execute_set_price_source(e: &Env, asset: &Address, source: &Address) {
    require_matching_feed_decimals(e, source);
    storage::set_price_source(e, asset, source);
}

/// Set the fallback oracle for the pool
///
/// Panics if the feed's decimals do not match the default feed's
pub fn execute_set_fallback_oracle(e: &Env, oracle: &Address) {
    require_matching_feed_decimals(e, oracle);
    storage::set_fallback_oracle(e, oracle);
}

// Prices are compared in the default feed's decimals, so every extra feed
// must quote with the same decimals
fn require_matching_feed_decimals(e: &Env, feed: &Address) {
    let pool_config = storage::get_pool_config(e);
    let base_decimals = PriceFeedClient::new(e, &pool_config.oracle).decimals();
    if PriceFeedClient::new(e, feed).decimals() != base_decimals {
        panic_with_error!(e, PoolError::BadRequest);
    }
}

fn require_valid_reserve_metadata(e: &Env, metadata: &ReserveConfig) {
    if metadata.decimals > 18
        || metadata.ltv > metadata.liq_threshold
        || metadata.liq_threshold > 1_0000
        || metadata.liq_bonus < 1_0000
        || metadata.reserve_factor > 1_0000
        || metadata.optimal_util <= 0
        || metadata.optimal_util > RAY
        || metadata.base_rate < 0
        || metadata.slope_one < 0
        || metadata.slope_two < 0
    {
        panic_with_error!(e, PoolError::InvalidReserveMetadata);
    }
}
