use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    errors::PoolError,
    storage::{self, ReserveKey},
    validator::require_positive,
};

use super::{Pool, User};

/// Perform a repayment of "on_behalf_of"'s debt against the reserve with
/// underlying tokens from "from". An amount of i128::MAX, or any amount over
/// the outstanding debt, repays the full balance.
///
/// Returns the underlying tokens repaid.
///
/// ### Panics
/// If the repayment cannot be completed
pub fn execute_repay(
    e: &Env,
    from: &Address,
    key: &ReserveKey,
    amount: i128,
    on_behalf_of: &Address,
) -> i128 {
    let mut pool = Pool::load(e);
    pool.require_not_paused(e);
    storage::require_res_unlocked(e, key);

    let mut reserve = pool.load_reserve(e, key);
    reserve.require_active(e);

    let mut user = User::load(e, on_behalf_of);
    let cur_d_tokens = user.get_liabilities(reserve.index);
    if cur_d_tokens == 0 {
        panic_with_error!(e, PoolError::BalanceError);
    }

    let (d_tokens, amount_in) = if amount == i128::MAX {
        (cur_d_tokens, reserve.to_asset_from_d_token(e, cur_d_tokens))
    } else {
        require_positive(e, &amount);
        let d_tokens = reserve.to_d_token(e, amount);
        if d_tokens > cur_d_tokens {
            // clamp over-repayments to the outstanding debt
            (cur_d_tokens, reserve.to_asset_from_d_token(e, cur_d_tokens))
        } else {
            (d_tokens, amount)
        }
    };

    user.remove_liabilities(e, &mut reserve, d_tokens);
    reserve.underlying_bal += amount_in;
    reserve.update_rates(e);
    reserve.store(e);
    user.store(e);

    TokenClient::new(e, &key.asset).transfer(from, &e.current_contract_address(), &amount_in);

    e.events().publish(
        (Symbol::new(e, "repay"), key.asset.clone(), from.clone()),
        (on_behalf_of.clone(), amount_in, d_tokens),
    );

    amount_in
}
