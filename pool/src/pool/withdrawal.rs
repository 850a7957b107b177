use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    errors::PoolError,
    storage::{self, ReserveKey},
    validator::require_positive,
};

use super::{farming, PositionData, Pool, User};

/// Perform a withdraw of "amount" underlying tokens from "from"'s position in
/// the reserve, sending the underlying to "to". An amount of i128::MAX
/// withdraws the full balance.
///
/// Returns the underlying tokens withdrawn.
///
/// ### Panics
/// If the withdraw cannot be completed or leaves "from"'s positions unhealthy
pub fn execute_withdraw(
    e: &Env,
    from: &Address,
    key: &ReserveKey,
    amount: i128,
    to: &Address,
) -> i128 {
    let mut pool = Pool::load(e);
    pool.require_not_paused(e);
    storage::require_res_unlocked(e, key);

    let mut reserve = pool.load_reserve(e, key);
    reserve.require_active(e);

    let mut user = User::load(e, from);
    let is_collateral = user.get_collateral(reserve.index) > 0;
    let cur_b_tokens = user.get_total_supply(reserve.index);
    if cur_b_tokens == 0 {
        panic_with_error!(e, PoolError::BalanceError);
    }

    let (b_tokens, tokens_out) = if amount == i128::MAX {
        (cur_b_tokens, reserve.to_asset_from_b_token(e, cur_b_tokens))
    } else {
        require_positive(e, &amount);
        let b_tokens = reserve.to_b_token(e, amount);
        if b_tokens > cur_b_tokens {
            panic_with_error!(e, PoolError::BalanceError);
        }
        (b_tokens, amount)
    };

    if is_collateral {
        user.remove_collateral(e, &mut reserve, b_tokens);
    } else {
        user.remove_supply(e, &mut reserve, b_tokens);
    }

    farming::provision_liquidity(e, &mut reserve, tokens_out);
    reserve.underlying_bal -= tokens_out;
    reserve.update_rates(e);
    pool.cache_reserve(reserve, true);

    // removing collateral can push a borrower under water
    if is_collateral && user.positions.has_liabilities() {
        let position_data = PositionData::calculate_from_positions(e, &mut pool, &user.positions);
        position_data.require_healthy(e);
    }

    pool.store_cached_reserves(e);
    user.store(e);

    TokenClient::new(e, &key.asset).transfer(&e.current_contract_address(), to, &tokens_out);

    e.events().publish(
        (Symbol::new(e, "withdraw"), key.asset.clone(), from.clone()),
        (to.clone(), tokens_out, b_tokens),
    );

    tokens_out
}
