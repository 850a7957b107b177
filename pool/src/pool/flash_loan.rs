use sep_41_token::TokenClient;
use soroban_sdk::{Address, Env, Symbol};

use crate::{
    constants::{FLASH_LOAN_PREMIUM, RAY},
    dependencies::FlashLoanReceiverClient,
    math::{percent_mul, ray_div, ray_mul},
    storage::{self, ReserveKey},
    validator::require_positive,
};

use super::{Pool, Reserve};

/// Perform a flash loan of "amount" underlying tokens to "receiver". The
/// receiver must approve the pool for the loan plus the premium before its
/// callback completes; the pool pulls the repayment back. The premium accrues
/// to the reserve's suppliers.
///
/// Returns the premium charged.
///
/// ### Panics
/// If the loan cannot be funded or the repayment cannot be pulled from the
/// receiver
pub fn execute_flash_loan(
    e: &Env,
    from: &Address,
    receiver: &Address,
    key: &ReserveKey,
    amount: i128,
) -> i128 {
    let pool = Pool::load(e);
    pool.require_not_paused(e);
    require_positive(e, &amount);
    storage::require_res_unlocked(e, key);

    let mut reserve = pool.load_reserve(e, key);
    reserve.require_active(e);

    let premium = percent_mul(e, amount, FLASH_LOAN_PREMIUM);

    // the loaned tokens leave the pool for the duration of the callback, so
    // the ledger copy of the reserve reflects that before the call-out
    super::farming::provision_liquidity(e, &mut reserve, amount);
    reserve.underlying_bal -= amount;
    reserve.update_rates(e);
    reserve.store(e);

    // the host rejects reentrant pool invocations outright; the lock also
    // fails direct entry points against this reserve with a pool error
    storage::set_res_lock(e, key);

    let token_client = TokenClient::new(e, &key.asset);
    let pool_address = e.current_contract_address();
    token_client.transfer(&pool_address, receiver, &amount);
    FlashLoanReceiverClient::new(e, receiver).exec_op(from, &key.asset, &amount, &premium);
    token_client.transfer_from(&pool_address, receiver, &pool_address, &(amount + premium));

    storage::del_res_lock(e, key);

    let mut reserve = Reserve::load(e, key);
    reserve.underlying_bal += amount + premium;
    // fold the premium into the supply index so it accrues to suppliers
    if premium > 0 && reserve.b_supply > 0 {
        let index_delta = ray_div(e, premium, reserve.total_supply(e));
        reserve.liquidity_index = ray_mul(e, reserve.liquidity_index, RAY + index_delta);
    }
    reserve.update_rates(e);
    reserve.store(e);

    e.events().publish(
        (Symbol::new(e, "flash_loan"), key.asset.clone(), from.clone()),
        (receiver.clone(), amount, premium),
    );

    premium
}
