use cast::i128;
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{contracttype, panic_with_error, unwrap::UnwrapOptimized, Env};

use crate::{
    constants::{SCALAR_BPS, WAD},
    errors::PoolError,
    math::mul_div_half_up,
    storage,
};

use super::{Pool, Positions};

/// The mutable position data for a user, denominated in the oracle's base asset
pub struct PositionData {
    /// The raw collateral value of the user's positions
    pub collateral_raw: i128,
    /// The collateral value weighted by each reserve's liquidation threshold
    pub collateral_threshold: i128,
    /// The collateral value weighted by each reserve's loan-to-value ratio
    pub collateral_ltv: i128,
    /// The raw liability value of the user's positions
    pub liability_raw: i128,
    /// The scalar of the oracle's price values
    pub scalar: i128,
}

impl PositionData {
    /// Calculate the position data for a set of positions, pricing each
    /// reserve with the pool's oracle configuration.
    ///
    /// ### Arguments
    /// * pool - The pool
    /// * positions - The positions to calculate the position data for
    pub fn calculate_from_positions(e: &Env, pool: &mut Pool, positions: &Positions) -> Self {
        let oracle_decimals = pool.load_price_decimals(e);
        let oracle_scalar = 10i128.pow(oracle_decimals);

        let reserve_list = storage::get_res_list(e);
        let mut collateral_raw = 0;
        let mut collateral_threshold = 0;
        let mut collateral_ltv = 0;
        let mut liability_raw = 0;
        for i in 0..reserve_list.len() {
            let b_token_balance = positions.collateral.get(i).unwrap_or(0);
            let d_token_balance = positions.liabilities.get(i).unwrap_or(0);
            if b_token_balance == 0 && d_token_balance == 0 {
                continue;
            }
            let key = reserve_list.get_unchecked(i);
            let reserve = pool.load_reserve(e, &key);
            let asset_to_base = pool.load_price(e, &reserve.asset);

            if b_token_balance > 0 {
                // append the effective collateral to the collateral accumulators
                let asset_collateral = reserve.to_asset_from_b_token(e, b_token_balance);
                let base_collateral = asset_to_base
                    .fixed_mul_floor(asset_collateral, reserve.scalar)
                    .unwrap_optimized();
                collateral_raw += base_collateral;
                collateral_threshold += base_collateral
                    .fixed_mul_floor(i128(reserve.liq_threshold), SCALAR_BPS)
                    .unwrap_optimized();
                collateral_ltv += base_collateral
                    .fixed_mul_floor(i128(reserve.ltv), SCALAR_BPS)
                    .unwrap_optimized();
            }

            if d_token_balance > 0 {
                // append the liability to the liability accumulator
                let asset_liability = reserve.to_asset_from_d_token(e, d_token_balance);
                liability_raw += asset_to_base
                    .fixed_mul_ceil(asset_liability, reserve.scalar)
                    .unwrap_optimized();
            }

            pool.cache_reserve(reserve, false);
        }

        PositionData {
            collateral_raw,
            collateral_threshold,
            collateral_ltv,
            liability_raw,
            scalar: oracle_scalar,
        }
    }

    /// The health factor of the positions as a wad scaled ratio of liquidation
    /// threshold weighted collateral over liabilities. Positions without any
    /// debt report the maximum value.
    pub fn as_health_factor(&self, e: &Env) -> i128 {
        if self.liability_raw == 0 {
            return i128::MAX;
        }
        mul_div_half_up(e, self.collateral_threshold, WAD, self.liability_raw)
    }

    /// Require that the positions are healthy, or panic
    pub fn require_healthy(&self, e: &Env) {
        if self.as_health_factor(e) < WAD {
            panic_with_error!(e, PoolError::InvalidHf);
        }
    }

    /// Require that the positions are unhealthy, or panic
    pub fn require_unhealthy(&self, e: &Env) {
        if self.as_health_factor(e) >= WAD {
            panic_with_error!(e, PoolError::HealthFactorNotBelowThreshold);
        }
    }

    /// Require that the liabilities fit under the loan-to-value weighted
    /// collateral, or panic
    pub fn require_within_ltv(&self, e: &Env) {
        if self.liability_raw > self.collateral_ltv {
            panic_with_error!(e, PoolError::InsufficientCollateral);
        }
    }

    /// Convert the position data to its view form
    pub fn to_account_data(&self, e: &Env) -> AccountData {
        let available_borrow = if self.collateral_ltv > self.liability_raw {
            self.collateral_ltv - self.liability_raw
        } else {
            0
        };
        AccountData {
            total_collateral: self.collateral_raw,
            total_debt: self.liability_raw,
            available_borrow,
            health_factor: self.as_health_factor(e),
        }
    }
}

/// An account level summary of a user's positions, denominated in the
/// oracle's base asset
#[derive(Clone)]
#[contracttype]
pub struct AccountData {
    pub total_collateral: i128,
    pub total_debt: i128,
    pub available_borrow: i128,
    pub health_factor: i128,
}
