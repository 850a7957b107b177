#![cfg(test)]

use crate::{
    constants::RAY,
    contract::PoolContract,
    pool::Reserve,
    storage::{self, ReserveConfig, ReserveData, ReserveKey},
};

use mock_yield_vault::{MockYieldVault, MockYieldVaultClient};
use sep_40_oracle::testutils::{MockPriceOracleClient, MockPriceOracleWASM};
use sep_41_token::testutils::{MockTokenClient, MockTokenWASM};
use soroban_sdk::{
    contract, contractimpl, testutils::Address as _, Address, Env, IntoVal, Symbol,
};

pub(crate) fn create_pool(e: &Env) -> Address {
    e.register_contract(None, PoolContract {})
}

pub(crate) fn create_token_contract<'a>(e: &Env, admin: &Address) -> (Address, MockTokenClient<'a>) {
    let contract_address = e.register_contract_wasm(None, MockTokenWASM);
    let client = MockTokenClient::new(e, &contract_address);
    client.initialize(admin, &7, &"unit".into_val(e), &"test".into_val(e));
    (contract_address, client)
}

pub(crate) fn create_mock_oracle<'a>(e: &Env) -> (Address, MockPriceOracleClient<'a>) {
    let contract_address = e.register_contract_wasm(None, MockPriceOracleWASM);
    (
        contract_address.clone(),
        MockPriceOracleClient::new(e, &contract_address),
    )
}

pub(crate) fn create_yield_vault<'a>(
    e: &Env,
    token: &Address,
) -> (Address, MockYieldVaultClient<'a>) {
    let contract_address = e.register_contract(None, MockYieldVault {});
    let client = MockYieldVaultClient::new(e, &contract_address);
    client.initialize(token);
    (contract_address, client)
}

/// Create a default reserve struct with the underlying and key zeroed out
pub(crate) fn default_reserve(e: &Env) -> Reserve {
    Reserve {
        asset: Address::generate(e),
        reserve_type: false,
        index: 0,
        scalar: 1_0000000,
        ltv: 7500,
        liq_threshold: 8000,
        liq_bonus: 1_0500,
        reserve_factor: 1000,
        base_rate: 10_000_000_000_000_000_000_000_000,
        slope_one: 40_000_000_000_000_000_000_000_000,
        slope_two: 600_000_000_000_000_000_000_000_000,
        optimal_util: 800_000_000_000_000_000_000_000_000,
        active: true,
        frozen: false,
        borrow_enabled: true,
        collateral_enabled: true,
        liquidity_index: RAY,
        borrow_index: RAY,
        liquidity_rate: 0,
        borrow_rate: 0,
        b_supply: 0,
        d_supply: 0,
        treasury_supply: 0,
        underlying_bal: 0,
        farming_bal: 0,
        last_time: 0,
    }
}

/// Create default reserve metadata, matching the values of `default_reserve`
pub(crate) fn default_reserve_meta() -> (ReserveConfig, ReserveData) {
    (
        ReserveConfig {
            index: 0,
            decimals: 7,
            ltv: 7500,
            liq_threshold: 8000,
            liq_bonus: 1_0500,
            reserve_factor: 1000,
            base_rate: 10_000_000_000_000_000_000_000_000,
            slope_one: 40_000_000_000_000_000_000_000_000,
            slope_two: 600_000_000_000_000_000_000_000_000,
            optimal_util: 800_000_000_000_000_000_000_000_000,
            active: true,
            frozen: false,
            borrow_enabled: true,
            collateral_enabled: true,
        },
        ReserveData {
            liquidity_index: RAY,
            borrow_index: RAY,
            liquidity_rate: 0,
            borrow_rate: 0,
            b_supply: 0,
            d_supply: 0,
            treasury_supply: 0,
            underlying_bal: 0,
            farming_bal: 0,
            last_time: 0,
        },
    )
}

/// Set up a reserve in the pool and mint the pool its directly held
/// underlying balance
pub(crate) fn create_reserve(
    e: &Env,
    pool: &Address,
    key: &ReserveKey,
    reserve_config: &ReserveConfig,
    reserve_data: &ReserveData,
) {
    let mut config = reserve_config.clone();
    e.as_contract(pool, || {
        let index = storage::push_res_list(e, key);
        config.index = index;
        storage::set_res_config(e, key, &config);
        storage::set_res_data(e, key, reserve_data);
    });
    if reserve_data.underlying_bal > 0 {
        let token_client = MockTokenClient::new(e, &key.asset);
        token_client.mock_all_auths().mint(pool, &reserve_data.underlying_bal);
    }
}

/********** Flash Loan Receiver Mock **********/

const RECEIVER_POOL_KEY: &str = "Pool";
const RECEIVER_NO_REPAY_KEY: &str = "NoRepay";

#[contract]
pub(crate) struct FlashLoanReceiverMock;

#[contractimpl]
impl FlashLoanReceiverMock {
    pub fn initialize(e: Env, pool: Address) {
        e.storage()
            .instance()
            .set(&Symbol::new(&e, RECEIVER_POOL_KEY), &pool);
    }

    pub fn set_no_repay(e: Env) {
        e.storage()
            .instance()
            .set(&Symbol::new(&e, RECEIVER_NO_REPAY_KEY), &true);
    }

    pub fn exec_op(e: Env, _caller: Address, asset: Address, amount: i128, premium: i128) {
        let pool: Address = e
            .storage()
            .instance()
            .get(&Symbol::new(&e, RECEIVER_POOL_KEY))
            .unwrap();

        let no_repay = e
            .storage()
            .instance()
            .get(&Symbol::new(&e, RECEIVER_NO_REPAY_KEY))
            .unwrap_or(false);
        if !no_repay {
            // let the pool pull the repayment back
            sep_41_token::TokenClient::new(&e, &asset).approve(
                &e.current_contract_address(),
                &pool,
                &(amount + premium),
                &(e.ledger().sequence() + 100),
            );
        }
    }
}

pub(crate) fn create_flash_loan_receiver(e: &Env, pool: &Address, _token: &Address) -> Address {
    let contract_address = e.register_contract(None, FlashLoanReceiverMock {});
    let client = FlashLoanReceiverMockClient::new(e, &contract_address);
    client.initialize(pool);
    contract_address
}

pub(crate) fn set_flash_loan_receiver_no_repay(e: &Env, receiver: &Address) {
    FlashLoanReceiverMockClient::new(e, receiver).set_no_repay();
}
