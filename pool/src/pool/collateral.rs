use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    errors::PoolError,
    storage::{self, ReserveKey},
};

use super::{PositionData, Pool, User};

/// Toggle whether "from"'s supply of the reserve backs their debt.
///
/// ### Panics
/// If the toggle cannot be completed or disabling leaves "from"'s positions
/// unhealthy
pub fn execute_set_collateral(e: &Env, from: &Address, key: &ReserveKey, enable: bool) {
    let mut pool = Pool::load(e);
    pool.require_not_paused(e);
    storage::require_res_unlocked(e, key);

    let mut reserve = pool.load_reserve(e, key);
    reserve.require_active(e);

    let mut user = User::load(e, from);
    if enable {
        if !reserve.collateral_enabled {
            panic_with_error!(e, PoolError::BadRequest);
        }
        let supply_balance = user.get_supply(reserve.index);
        if supply_balance == 0 {
            panic_with_error!(e, PoolError::BalanceError);
        }
        user.remove_supply(e, &mut reserve, supply_balance);
        user.add_collateral(&mut reserve, supply_balance);
    } else {
        let collateral_balance = user.get_collateral(reserve.index);
        if collateral_balance == 0 {
            panic_with_error!(e, PoolError::BalanceError);
        }
        user.remove_collateral(e, &mut reserve, collateral_balance);
        user.add_supply(&mut reserve, collateral_balance);
    }
    pool.cache_reserve(reserve, true);

    // dropping collateral can push a borrower under water
    if !enable && user.positions.has_liabilities() {
        let position_data = PositionData::calculate_from_positions(e, &mut pool, &user.positions);
        position_data.require_healthy(e);
    }

    pool.store_cached_reserves(e);
    user.store(e);

    e.events().publish(
        (
            Symbol::new(e, "set_collateral"),
            key.asset.clone(),
            from.clone(),
        ),
        enable,
    );
}
