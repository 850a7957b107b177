use cast::i128;
use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    constants::CLOSE_FACTOR,
    errors::PoolError,
    math::{mul_div_half_up, percent_div, percent_mul},
    storage::{self, ReserveKey},
    validator::require_positive,
};

use super::{farming, PositionData, Pool, User};

/// Perform a liquidation of "user"'s unhealthy positions. The liquidator
/// repays up to the close factor of the user's debt against "debt_key" and
/// seizes a bonus-weighted amount of the user's collateral in
/// "collateral_key", either as underlying tokens or as a supply position.
///
/// Returns (debt repaid, collateral seized), in underlying tokens.
///
/// ### Panics
/// If the liquidation cannot be completed
#[allow(clippy::too_many_arguments)]
pub fn execute_liquidation(
    e: &Env,
    liquidator: &Address,
    user: &Address,
    collateral_key: &ReserveKey,
    debt_key: &ReserveKey,
    debt_to_cover: i128,
    receive_collateral_tokens: bool,
) -> (i128, i128) {
    if liquidator == user {
        panic_with_error!(e, PoolError::BadRequest);
    }

    let mut pool = Pool::load(e);
    pool.require_not_paused(e);
    require_positive(e, &debt_to_cover);
    storage::require_res_unlocked(e, collateral_key);
    storage::require_res_unlocked(e, debt_key);

    // accrue both reserves before measuring the user's health
    let reserve = pool.load_reserve(e, collateral_key);
    reserve.require_active(e);
    pool.cache_reserve(reserve, true);
    let reserve = pool.load_reserve(e, debt_key);
    reserve.require_active(e);
    pool.cache_reserve(reserve, true);

    let mut user_state = User::load(e, user);
    let position_data = PositionData::calculate_from_positions(e, &mut pool, &user_state.positions);
    position_data.require_unhealthy(e);

    let mut debt_reserve = pool.load_reserve(e, debt_key);
    let cur_d_tokens = user_state.get_liabilities(debt_reserve.index);
    if cur_d_tokens == 0 {
        panic_with_error!(e, PoolError::NoDebtOfSelectedType);
    }

    let collateral_reserve = pool.load_reserve(e, collateral_key);
    let user_coll_b_tokens = user_state.get_collateral(collateral_reserve.index);
    if user_coll_b_tokens == 0 {
        panic_with_error!(e, PoolError::CollateralCannotBeLiquidated);
    }

    // only the close factor share of the debt can be repaid in one call
    let max_close = percent_mul(
        e,
        debt_reserve.to_asset_from_d_token(e, cur_d_tokens),
        CLOSE_FACTOR,
    );
    let mut actual_debt = debt_to_cover.min(max_close);

    let debt_price = pool.load_price(e, &debt_reserve.asset);
    let collateral_price = pool.load_price(e, &collateral_reserve.asset);

    let debt_value = mul_div_half_up(e, actual_debt, debt_price, debt_reserve.scalar);
    let bonus_value = percent_mul(e, debt_value, i128(collateral_reserve.liq_bonus));
    let mut seized_tokens = mul_div_half_up(
        e,
        bonus_value,
        collateral_reserve.scalar,
        collateral_price,
    );

    // if the bonus overshoots the user's collateral, seize it all and scale
    // the repaid debt back down
    let user_coll_tokens = collateral_reserve.to_asset_from_b_token(e, user_coll_b_tokens);
    if seized_tokens > user_coll_tokens {
        seized_tokens = user_coll_tokens;
        let seized_value = mul_div_half_up(
            e,
            seized_tokens,
            collateral_price,
            collateral_reserve.scalar,
        );
        let adj_debt_value = percent_div(e, seized_value, i128(collateral_reserve.liq_bonus));
        actual_debt = mul_div_half_up(e, adj_debt_value, debt_reserve.scalar, debt_price);
    }

    // burn the repaid debt
    let d_tokens_burnt = debt_reserve.to_d_token(e, actual_debt).min(cur_d_tokens);
    user_state.remove_liabilities(e, &mut debt_reserve, d_tokens_burnt);
    debt_reserve.underlying_bal += actual_debt;
    debt_reserve.update_rates(e);
    pool.cache_reserve(debt_reserve, true);

    // seize the collateral, reloading in case both keys point at the same reserve
    let mut collateral_reserve = pool.load_reserve(e, collateral_key);
    let b_tokens_seized = collateral_reserve
        .to_b_token(e, seized_tokens)
        .min(user_coll_b_tokens);
    user_state.remove_collateral(e, &mut collateral_reserve, b_tokens_seized);

    if receive_collateral_tokens {
        // hand the seized position to the liquidator in place
        let mut liquidator_state = User::load(e, liquidator);
        if collateral_reserve.collateral_enabled
            && liquidator_state.get_supply(collateral_reserve.index) == 0
        {
            liquidator_state.add_collateral(&mut collateral_reserve, b_tokens_seized);
        } else {
            liquidator_state.add_supply(&mut collateral_reserve, b_tokens_seized);
        }
        liquidator_state.store(e);
    } else {
        farming::provision_liquidity(e, &mut collateral_reserve, seized_tokens);
        collateral_reserve.underlying_bal -= seized_tokens;
    }
    collateral_reserve.update_rates(e);
    pool.cache_reserve(collateral_reserve, true);

    pool.store_cached_reserves(e);
    user_state.store(e);

    TokenClient::new(e, &debt_key.asset).transfer(
        liquidator,
        &e.current_contract_address(),
        &actual_debt,
    );
    if !receive_collateral_tokens {
        TokenClient::new(e, &collateral_key.asset).transfer(
            &e.current_contract_address(),
            liquidator,
            &seized_tokens,
        );
    }

    e.events().publish(
        (
            Symbol::new(e, "liquidation"),
            user.clone(),
            liquidator.clone(),
        ),
        (
            debt_key.asset.clone(),
            collateral_key.asset.clone(),
            actual_debt,
            seized_tokens,
        ),
    );

    (actual_debt, seized_tokens)
}
