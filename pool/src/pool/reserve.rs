use cast::i128;
use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::{
    constants::RAY,
    errors::PoolError,
    math::{percent_mul, ray_div, ray_mul},
    storage::{self, ReserveData, ReserveKey},
};

use super::interest::{calc_compounded_interest, calc_interest_rates, calc_linear_interest};

#[derive(Clone)]
#[contracttype]
pub struct Reserve {
    pub asset: Address,        // the underlying asset address
    pub reserve_type: bool,    // the reserve flavor for the asset
    pub index: u32,            // the reserve index in the pool
    pub scalar: i128,          // scalar for underlying balances
    pub ltv: u32,              // the loan-to-value ratio in basis points
    pub liq_threshold: u32,    // the liquidation threshold in basis points
    pub liq_bonus: u32,        // the liquidation bonus in basis points
    pub reserve_factor: u32,   // the treasury share of interest in basis points
    pub base_rate: i128,       // the base borrow rate in ray
    pub slope_one: i128,       // the rate slope below optimal utilization in ray
    pub slope_two: i128,       // the rate slope above optimal utilization in ray
    pub optimal_util: i128,    // the optimal utilization rate in ray
    pub active: bool,          // whether the reserve accepts any operations
    pub frozen: bool,          // whether deposits and borrows are halted
    pub borrow_enabled: bool,  // whether the reserve can be borrowed from
    pub collateral_enabled: bool, // whether deposits can back debt
    pub liquidity_index: i128, // the cumulative supply-side interest index in ray
    pub borrow_index: i128,    // the cumulative borrow-side interest index in ray
    pub liquidity_rate: i128,  // the current supply-side rate in ray
    pub borrow_rate: i128,     // the current borrow-side rate in ray
    pub b_supply: i128,        // the total scaled supply balance
    pub d_supply: i128,        // the total scaled debt balance
    pub treasury_supply: i128, // the scaled supply balance accrued to the treasury
    pub underlying_bal: i128,  // underlying tokens held directly by the pool
    pub farming_bal: i128,     // underlying tokens placed in the yield vault
    pub last_time: u64,        // the last timestamp the indices were updated
}

impl Reserve {
    /// Load a Reserve from the ledger and accrue interest to the current ledger timestamp.
    ///
    /// **NOTE**: This function is not cached, and should be called from the Pool.
    ///
    /// ### Arguments
    /// * key - The reserve key
    ///
    /// ### Panics
    /// If the reserve does not exist
    pub fn load(e: &Env, key: &ReserveKey) -> Reserve {
        if !storage::has_res(e, key) {
            panic_with_error!(e, PoolError::ReserveNotFound);
        }
        let reserve_config = storage::get_res_config(e, key);
        let reserve_data = storage::get_res_data(e, key);
        let mut reserve = Reserve {
            asset: key.asset.clone(),
            reserve_type: key.reserve_type,
            index: reserve_config.index,
            scalar: 10i128.pow(reserve_config.decimals),
            ltv: reserve_config.ltv,
            liq_threshold: reserve_config.liq_threshold,
            liq_bonus: reserve_config.liq_bonus,
            reserve_factor: reserve_config.reserve_factor,
            base_rate: reserve_config.base_rate,
            slope_one: reserve_config.slope_one,
            slope_two: reserve_config.slope_two,
            optimal_util: reserve_config.optimal_util,
            active: reserve_config.active,
            frozen: reserve_config.frozen,
            borrow_enabled: reserve_config.borrow_enabled,
            collateral_enabled: reserve_config.collateral_enabled,
            liquidity_index: reserve_data.liquidity_index,
            borrow_index: reserve_data.borrow_index,
            liquidity_rate: reserve_data.liquidity_rate,
            borrow_rate: reserve_data.borrow_rate,
            b_supply: reserve_data.b_supply,
            d_supply: reserve_data.d_supply,
            treasury_supply: reserve_data.treasury_supply,
            underlying_bal: reserve_data.underlying_bal,
            farming_bal: reserve_data.farming_bal,
            last_time: reserve_data.last_time,
        };

        // short circuit if the reserve has already been updated this ledger
        if e.ledger().timestamp() == reserve.last_time {
            return reserve;
        }

        if reserve.d_supply == 0 {
            reserve.last_time = e.ledger().timestamp();
            return reserve;
        }

        let delta = e.ledger().timestamp() - reserve.last_time;
        let prev_borrow_index = reserve.borrow_index;
        let compounded = calc_compounded_interest(e, reserve.borrow_rate, delta);
        reserve.borrow_index = ray_mul(e, prev_borrow_index, compounded);
        let linear = calc_linear_interest(reserve.liquidity_rate, delta);
        reserve.liquidity_index = ray_mul(e, reserve.liquidity_index, linear);

        // mint the treasury's share of the newly accrued debt interest as
        // scaled supply, diluting suppliers by the reserve factor
        let accrued_debt = ray_mul(e, reserve.d_supply, reserve.borrow_index)
            - ray_mul(e, reserve.d_supply, prev_borrow_index);
        if reserve.reserve_factor > 0 && accrued_debt > 0 {
            let treasury_cut = percent_mul(e, accrued_debt, i128(reserve.reserve_factor));
            let minted = ray_div(e, treasury_cut, reserve.liquidity_index);
            reserve.treasury_supply += minted;
            reserve.b_supply += minted;
        }

        reserve.last_time = e.ledger().timestamp();
        reserve
    }

    /// Store the updated reserve to the ledger.
    pub fn store(&self, e: &Env) {
        let reserve_data = ReserveData {
            liquidity_index: self.liquidity_index,
            borrow_index: self.borrow_index,
            liquidity_rate: self.liquidity_rate,
            borrow_rate: self.borrow_rate,
            b_supply: self.b_supply,
            d_supply: self.d_supply,
            treasury_supply: self.treasury_supply,
            underlying_bal: self.underlying_bal,
            farming_bal: self.farming_bal,
            last_time: self.last_time,
        };
        storage::set_res_data(e, &self.key(), &reserve_data);
    }

    /// The storage key for the reserve
    pub fn key(&self) -> ReserveKey {
        ReserveKey {
            asset: self.asset.clone(),
            reserve_type: self.reserve_type,
        }
    }

    /// Recalculate the reserve's rates from the current balances. Must be
    /// called after any operation that changes the reserve's liquidity or debt.
    pub fn update_rates(&mut self, e: &Env) {
        let (liquidity_rate, borrow_rate) = calc_interest_rates(
            e,
            self.base_rate,
            self.slope_one,
            self.slope_two,
            self.optimal_util,
            self.reserve_factor,
            self.underlying_bal + self.farming_bal,
            0,
            self.total_liabilities(e),
            0,
        );
        self.liquidity_rate = liquidity_rate;
        self.borrow_rate = borrow_rate;
    }

    /// The underlying tokens the reserve manages, held directly or placed in
    /// the yield vault
    pub fn total_managed(&self) -> i128 {
        self.underlying_bal + self.farming_bal
    }

    /// Fetch the total liabilities for the reserve in underlying tokens
    pub fn total_liabilities(&self, e: &Env) -> i128 {
        self.to_asset_from_d_token(e, self.d_supply)
    }

    /// Fetch the total supply for the reserve in underlying tokens
    pub fn total_supply(&self, e: &Env) -> i128 {
        self.to_asset_from_b_token(e, self.b_supply)
    }

    /// Require that the reserve is active, or panic
    pub fn require_active(&self, e: &Env) {
        if !self.active {
            panic_with_error!(e, PoolError::ReserveInactive);
        }
    }

    /// Require that the reserve is not frozen, or panic
    pub fn require_not_frozen(&self, e: &Env) {
        if self.frozen {
            panic_with_error!(e, PoolError::ReserveFrozen);
        }
    }

    /// Require that the reserve allows borrowing, or panic
    pub fn require_borrow_enabled(&self, e: &Env) {
        if !self.borrow_enabled {
            panic_with_error!(e, PoolError::BorrowNotEnabled);
        }
    }

    /********** Conversion Functions **********/

    /// Convert a scaled supply balance to the corresponding underlying value
    ///
    /// ### Arguments
    /// * `b_tokens` - The scaled balance to convert
    pub fn to_asset_from_b_token(&self, e: &Env, b_tokens: i128) -> i128 {
        ray_mul(e, b_tokens, self.liquidity_index)
    }

    /// Convert a scaled debt balance to the corresponding underlying value
    ///
    /// ### Arguments
    /// * `d_tokens` - The scaled balance to convert
    pub fn to_asset_from_d_token(&self, e: &Env, d_tokens: i128) -> i128 {
        ray_mul(e, d_tokens, self.borrow_index)
    }

    /// Convert an underlying amount to the corresponding scaled supply balance
    ///
    /// ### Arguments
    /// * `amount` - The underlying amount to convert
    pub fn to_b_token(&self, e: &Env, amount: i128) -> i128 {
        ray_div(e, amount, self.liquidity_index)
    }

    /// Convert an underlying amount to the corresponding scaled debt balance
    ///
    /// ### Arguments
    /// * `amount` - The underlying amount to convert
    pub fn to_d_token(&self, e: &Env, amount: i128) -> i128 {
        ray_div(e, amount, self.borrow_index)
    }
}
