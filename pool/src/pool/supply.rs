use sep_41_token::TokenClient;
use soroban_sdk::{Address, Env, Symbol};

use crate::{
    storage::{self, ReserveKey},
    validator::require_positive,
};

use super::{Pool, User};

/// Perform a deposit of "amount" underlying tokens from "from" into the
/// reserve, crediting the position to "on_behalf_of".
///
/// Returns the scaled supply balance minted.
///
/// ### Panics
/// If the deposit cannot be completed
pub fn execute_deposit(
    e: &Env,
    from: &Address,
    key: &ReserveKey,
    amount: i128,
    on_behalf_of: &Address,
) -> i128 {
    let mut pool = Pool::load(e);
    pool.require_not_paused(e);
    require_positive(e, &amount);
    storage::require_res_unlocked(e, key);

    let mut reserve = pool.load_reserve(e, key);
    reserve.require_active(e);
    reserve.require_not_frozen(e);

    let b_tokens = reserve.to_b_token(e, amount);
    require_positive(e, &b_tokens);

    let mut user = User::load(e, on_behalf_of);
    // deposits back debt by default when the reserve allows it, unless the
    // user already opted this reserve out of collateral
    if reserve.collateral_enabled && user.get_supply(reserve.index) == 0 {
        user.add_collateral(&mut reserve, b_tokens);
    } else {
        user.add_supply(&mut reserve, b_tokens);
    }
    reserve.underlying_bal += amount;
    reserve.update_rates(e);
    reserve.store(e);
    user.store(e);

    TokenClient::new(e, &reserve.asset).transfer(from, &e.current_contract_address(), &amount);

    e.events().publish(
        (Symbol::new(e, "deposit"), key.asset.clone(), from.clone()),
        (on_behalf_of.clone(), amount, b_tokens),
    );

    b_tokens
}
