use cast::i128;
use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    dependencies::YieldVaultClient,
    errors::PoolError,
    math::percent_mul,
    storage::{self, FarmingConfig, ReserveKey},
};

use super::reserve::Reserve;

/// Set the rehypothecation configuration for a reserve
///
/// ### Panics
/// If the reserve does not exist or the config is invalid
pub fn execute_set_farming_config(e: &Env, key: &ReserveKey, config: &FarmingConfig) {
    if !storage::has_res(e, key) {
        panic_with_error!(e, PoolError::ReserveNotFound);
    }
    if config.farming_pct > 1_0000 || config.drift > 1_0000 || config.claiming_threshold < 0 {
        panic_with_error!(e, PoolError::InvalidReserveMetadata);
    }
    storage::set_farming_config(e, key, config);

    e.events().publish(
        (Symbol::new(e, "set_farming_config"), key.asset.clone()),
        (config.vault.clone(), config.farming_pct, config.drift),
    );
}

/// Rebalance the reserve's liquidity against its yield vault, claiming any
/// realized profit along the way. Liquidity is only moved when the farmed
/// share has drifted out of the configured dead band around the target.
///
/// Remains callable while the pool is paused so farmed liquidity can be
/// recalled.
///
/// ### Panics
/// If the reserve has no rehypothecation config
pub fn execute_rebalance(e: &Env, key: &ReserveKey) {
    storage::require_res_unlocked(e, key);
    let config = match storage::get_farming_config(e, key) {
        Some(config) => config,
        None => panic_with_error!(e, PoolError::FarmingNotConfigured),
    };
    let mut reserve = Reserve::load(e, key);
    let vault_client = YieldVaultClient::new(e, &config.vault);
    let token_client = TokenClient::new(e, &key.asset);
    let pool_address = e.current_contract_address();

    // vault gains above the tracked principal are realized yield
    let vault_assets = vault_client.assets_of(&pool_address);
    let profit = vault_assets - reserve.farming_bal;
    if profit > 0 && profit >= config.claiming_threshold {
        vault_client.withdraw(&pool_address, &profit);
        token_client.transfer(&pool_address, &config.profit_handler, &profit);

        e.events().publish(
            (Symbol::new(e, "claim_yield"), key.asset.clone()),
            (config.profit_handler.clone(), profit),
        );
    }

    let total_managed = reserve.total_managed();
    let target = percent_mul(e, total_managed, i128(config.farming_pct));
    let drift_amount = percent_mul(e, total_managed, i128(config.drift));
    if reserve.farming_bal > target && reserve.farming_bal - target > drift_amount {
        let excess = reserve.farming_bal - target;
        vault_client.withdraw(&pool_address, &excess);
        reserve.farming_bal -= excess;
        reserve.underlying_bal += excess;
    } else if target > reserve.farming_bal && target - reserve.farming_bal > drift_amount {
        let shortfall = target - reserve.farming_bal;
        token_client.transfer(&pool_address, &config.vault, &shortfall);
        vault_client.deposit(&pool_address, &shortfall);
        reserve.farming_bal += shortfall;
        reserve.underlying_bal -= shortfall;
    }
    reserve.store(e);

    e.events().publish(
        (Symbol::new(e, "rebalance"), key.asset.clone()),
        (reserve.underlying_bal, reserve.farming_bal),
    );
}

/// Ensure the reserve holds at least "amount" underlying tokens directly,
/// pulling the shortfall back from the yield vault if needed.
///
/// ### Panics
/// If the shortfall cannot be recalled from the vault
pub fn provision_liquidity(e: &Env, reserve: &mut Reserve, amount: i128) {
    if reserve.underlying_bal >= amount {
        return;
    }
    let shortfall = amount - reserve.underlying_bal;

    let config = match storage::get_farming_config(e, &reserve.key()) {
        Some(config) => config,
        None => panic_with_error!(e, PoolError::InsufficientLiquidity),
    };
    if shortfall > reserve.farming_bal {
        panic_with_error!(e, PoolError::InsufficientLiquidity);
    }
    let vault_client = YieldVaultClient::new(e, &config.vault);
    let pool_address = e.current_contract_address();
    if shortfall > vault_client.max_withdraw(&pool_address) {
        panic_with_error!(e, PoolError::InsufficientLiquidity);
    }

    vault_client.withdraw(&pool_address, &shortfall);
    reserve.farming_bal -= shortfall;
    reserve.underlying_bal += shortfall;
}

/// Pay out the treasury's accrued share of the reserve's interest.
///
/// Returns the underlying tokens sent to the treasury.
pub fn execute_claim_treasury(e: &Env, key: &ReserveKey) -> i128 {
    storage::require_res_unlocked(e, key);
    let pool_config = storage::get_pool_config(e);
    let mut reserve = Reserve::load(e, key);
    if reserve.treasury_supply == 0 {
        reserve.store(e);
        return 0;
    }

    let amount = reserve.to_asset_from_b_token(e, reserve.treasury_supply);
    provision_liquidity(e, &mut reserve, amount);
    reserve.b_supply -= reserve.treasury_supply;
    reserve.treasury_supply = 0;
    reserve.underlying_bal -= amount;
    reserve.update_rates(e);
    reserve.store(e);

    TokenClient::new(e, &key.asset).transfer(
        &e.current_contract_address(),
        &pool_config.treasury,
        &amount,
    );

    e.events().publish(
        (Symbol::new(e, "claim_treasury"), key.asset.clone()),
        (pool_config.treasury.clone(), amount),
    );

    amount
}

/// The underlying tokens the reserve manages, held directly or farmed
pub fn total_managed_assets(e: &Env, key: &ReserveKey) -> i128 {
    Reserve::load(e, key).total_managed()
}
