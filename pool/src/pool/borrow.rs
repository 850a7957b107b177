use sep_41_token::TokenClient;
use soroban_sdk::{Address, Env, Symbol};

use crate::{
    storage::{self, ReserveKey},
    validator::require_positive,
};

use super::{farming, PositionData, Pool, User};

/// Perform a borrow of "amount" underlying tokens from the reserve against
/// "from"'s collateral.
///
/// Returns the scaled debt balance minted.
///
/// ### Panics
/// If the borrow cannot be completed or exceeds "from"'s borrowing power
pub fn execute_borrow(e: &Env, from: &Address, key: &ReserveKey, amount: i128) -> i128 {
    let mut pool = Pool::load(e);
    pool.require_not_paused(e);
    require_positive(e, &amount);
    storage::require_res_unlocked(e, key);

    let mut reserve = pool.load_reserve(e, key);
    reserve.require_active(e);
    reserve.require_not_frozen(e);
    reserve.require_borrow_enabled(e);

    let d_tokens = reserve.to_d_token(e, amount);
    require_positive(e, &d_tokens);

    let mut user = User::load(e, from);
    user.add_liabilities(&mut reserve, d_tokens);

    farming::provision_liquidity(e, &mut reserve, amount);
    reserve.underlying_bal -= amount;
    reserve.update_rates(e);
    pool.cache_reserve(reserve, true);

    let position_data = PositionData::calculate_from_positions(e, &mut pool, &user.positions);
    position_data.require_within_ltv(e);

    pool.store_cached_reserves(e);
    user.store(e);

    TokenClient::new(e, &key.asset).transfer(&e.current_contract_address(), from, &amount);

    e.events().publish(
        (Symbol::new(e, "borrow"), key.asset.clone(), from.clone()),
        (amount, d_tokens),
    );

    d_tokens
}
