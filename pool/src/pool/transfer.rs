use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    errors::PoolError,
    storage::{self, ReserveKey},
    validator::require_positive,
};

use super::{PositionData, Pool, User};

/// Transfer "amount" of "from"'s scaled supply balance in the reserve to
/// "to". An amount of i128::MAX transfers the full balance. No underlying
/// tokens move, only the claim on them.
///
/// Returns the scaled supply balance transferred.
///
/// ### Panics
/// If the transfer cannot be completed or leaves "from"'s positions unhealthy
pub fn execute_transfer_supply(
    e: &Env,
    from: &Address,
    key: &ReserveKey,
    amount: i128,
    to: &Address,
) -> i128 {
    if from == to {
        panic_with_error!(e, PoolError::BadRequest);
    }

    let mut pool = Pool::load(e);
    pool.require_not_paused(e);
    storage::require_res_unlocked(e, key);

    let mut reserve = pool.load_reserve(e, key);
    reserve.require_active(e);

    let mut sender = User::load(e, from);
    let is_collateral = sender.get_collateral(reserve.index) > 0;
    let cur_b_tokens = sender.get_total_supply(reserve.index);
    if cur_b_tokens == 0 {
        panic_with_error!(e, PoolError::BalanceError);
    }

    let b_tokens = if amount == i128::MAX {
        cur_b_tokens
    } else {
        require_positive(e, &amount);
        if amount > cur_b_tokens {
            panic_with_error!(e, PoolError::BalanceError);
        }
        amount
    };

    if is_collateral {
        sender.remove_collateral(e, &mut reserve, b_tokens);
    } else {
        sender.remove_supply(e, &mut reserve, b_tokens);
    }

    // the recipient's balance backs debt by default when the reserve allows
    // it, unless they already opted this reserve out of collateral
    let mut recipient = User::load(e, to);
    if reserve.collateral_enabled && recipient.get_supply(reserve.index) == 0 {
        recipient.add_collateral(&mut reserve, b_tokens);
    } else {
        recipient.add_supply(&mut reserve, b_tokens);
    }
    pool.cache_reserve(reserve, true);

    // handing away collateral can push a borrower under water
    if is_collateral && sender.positions.has_liabilities() {
        let position_data = PositionData::calculate_from_positions(e, &mut pool, &sender.positions);
        position_data.require_healthy(e);
    }

    pool.store_cached_reserves(e);
    sender.store(e);
    recipient.store(e);

    e.events().publish(
        (
            Symbol::new(e, "transfer_supply"),
            key.asset.clone(),
            from.clone(),
        ),
        (to.clone(), b_tokens),
    );

    b_tokens
}

#[cfg(test)]
mod tests {
    use super::super::execute_deposit;
    use super::*;
    use crate::{storage::PoolConfig, testutils};
    use sep_40_oracle::testutils::Asset;
    use soroban_sdk::{testutils::Address as _, vec};

    #[test]
    fn test_execute_transfer_supply_full_balance() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying, underlying_client) = testutils::create_token_contract(&e, &bombadil);
        underlying_client.mint(&samwise, &2000_000000);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (mut reserve_config, reserve_data) = testutils::default_reserve_meta();
        reserve_config.decimals = 6;
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle: Address::generate(&e),
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);

            execute_deposit(&e, &samwise, &key, 1000_000000, &samwise);
            let b_tokens = execute_transfer_supply(&e, &samwise, &key, i128::MAX, &frodo);
            assert_eq!(b_tokens, 1000_000000);

            let positions = storage::get_user_positions(&e, &samwise);
            assert_eq!(positions.collateral.len(), 0);
            assert_eq!(positions.supply.len(), 0);
            let positions = storage::get_user_positions(&e, &frodo);
            assert_eq!(positions.collateral.get_unchecked(0), 1000_000000);

            // only the claim moved
            let reserve_data = storage::get_res_data(&e, &key);
            assert_eq!(reserve_data.b_supply, 1000_000000);
            assert_eq!(reserve_data.underlying_bal, 1000_000000);
        });
        assert_eq!(underlying_client.balance(&pool), 1000_000000);
    }

    #[test]
    fn test_execute_transfer_supply_partial() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying, underlying_client) = testutils::create_token_contract(&e, &bombadil);
        underlying_client.mint(&samwise, &500_0000000);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (reserve_config, reserve_data) = testutils::default_reserve_meta();
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle: Address::generate(&e),
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);

            execute_deposit(&e, &samwise, &key, 100_0000000, &samwise);
            execute_transfer_supply(&e, &samwise, &key, 40_0000000, &frodo);

            let positions = storage::get_user_positions(&e, &samwise);
            assert_eq!(positions.collateral.get_unchecked(0), 60_0000000);
            let positions = storage::get_user_positions(&e, &frodo);
            assert_eq!(positions.collateral.get_unchecked(0), 40_0000000);
        });
    }

    #[test]
    fn test_execute_transfer_supply_respects_recipient_opt_out() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying, underlying_client) = testutils::create_token_contract(&e, &bombadil);
        underlying_client.mint(&samwise, &500_0000000);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (reserve_config, reserve_data) = testutils::default_reserve_meta();
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle: Address::generate(&e),
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);

            execute_deposit(&e, &samwise, &key, 100_0000000, &samwise);

            // seed an existing non-collateral supply position for frodo
            let mut user = User::load(&e, &frodo);
            let mut reserve = super::super::Reserve::load(&e, &key);
            user.add_supply(&mut reserve, 10_0000000);
            reserve.store(&e);
            user.store(&e);

            execute_transfer_supply(&e, &samwise, &key, 40_0000000, &frodo);

            let positions = storage::get_user_positions(&e, &frodo);
            assert_eq!(positions.supply.get_unchecked(0), 50_0000000);
            assert_eq!(positions.collateral.len(), 0);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1209)")]
    fn test_execute_transfer_supply_checks_health_factor() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);

        let (underlying, underlying_client) = testutils::create_token_contract(&e, &bombadil);
        underlying_client.mint(&samwise, &500_0000000);
        underlying_client.mint(&frodo, &500_0000000);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (reserve_config, reserve_data) = testutils::default_reserve_meta();
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(soroban_sdk::Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(underlying.clone())],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 1_0000000]);

        let pool_config = PoolConfig {
            oracle,
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);

            execute_deposit(&e, &frodo, &key, 200_0000000, &frodo);
            execute_deposit(&e, &samwise, &key, 100_0000000, &samwise);
            super::super::execute_borrow(&e, &samwise, &key, 60_0000000);

            // 60 debt against 80% of 50 remaining collateral is under water
            execute_transfer_supply(&e, &samwise, &key, 50_0000000, &frodo);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #10)")]
    fn test_execute_transfer_supply_no_position_panics() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying, _) = testutils::create_token_contract(&e, &bombadil);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (reserve_config, reserve_data) = testutils::default_reserve_meta();
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle: Address::generate(&e),
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            execute_transfer_supply(&e, &samwise, &key, 10_0000000, &frodo);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1200)")]
    fn test_execute_transfer_supply_to_self_panics() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying, underlying_client) = testutils::create_token_contract(&e, &bombadil);
        underlying_client.mint(&samwise, &500_0000000);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (reserve_config, reserve_data) = testutils::default_reserve_meta();
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle: Address::generate(&e),
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);

            execute_deposit(&e, &samwise, &key, 100_0000000, &samwise);
            execute_transfer_supply(&e, &samwise, &key, 10_0000000, &samwise);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1208)")]
    fn test_execute_transfer_supply_checks_paused() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pool(&e);

        let (underlying, _) = testutils::create_token_contract(&e, &bombadil);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (reserve_config, reserve_data) = testutils::default_reserve_meta();
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle: Address::generate(&e),
            treasury: Address::generate(&e),
            paused: true,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            execute_transfer_supply(&e, &samwise, &key, 10_0000000, &frodo);
        });
    }
}
