use cast::i128;
use soroban_sdk::Env;

use crate::{
    constants::{RAY, SCALAR_BPS, SECONDS_PER_YEAR},
    math::{mul_div_half_up, percent_mul, ray_div, ray_mul},
};

/// Calculate the linear interest accrued over a time delta, as a ray scaled
/// growth factor.
///
/// ### Arguments
/// * `rate` - The interest rate in ray
/// * `delta` - The elapsed time in seconds
pub fn calc_linear_interest(rate: i128, delta: u64) -> i128 {
    RAY + rate * i128(delta) / SECONDS_PER_YEAR
}

/// Calculate compounded interest accrued over a time delta, as a ray scaled
/// growth factor.
///
/// Uses a third order binomial expansion of `(1 + rate/secs_per_year)^delta`,
/// which slightly underestimates the true compounded value. The error is
/// negligible for the rates and accrual intervals the pool operates with.
///
/// ### Arguments
/// * `rate` - The interest rate in ray
/// * `delta` - The elapsed time in seconds
pub fn calc_compounded_interest(e: &Env, rate: i128, delta: u64) -> i128 {
    if delta == 0 {
        return RAY;
    }

    let exp = i128(delta);
    let exp_minus_one = exp - 1;
    let exp_minus_two = if exp > 2 { exp - 2 } else { 0 };

    let rate_per_second = rate / SECONDS_PER_YEAR;
    let base_power_two = ray_mul(e, rate_per_second, rate_per_second);
    let base_power_three = ray_mul(e, base_power_two, rate_per_second);

    let second_term = exp * exp_minus_one * base_power_two / 2;
    let third_term = exp * exp_minus_one * exp_minus_two * base_power_three / 6;

    RAY + rate_per_second * exp + second_term + third_term
}

/// Calculate the current liquidity and borrow rates for a reserve from the
/// two-slope rate curve.
///
/// Returns (liquidity_rate, borrow_rate), both in ray.
///
/// ### Arguments
/// * `base_rate` - The base borrow rate in ray
/// * `slope_one` - The rate slope below optimal utilization in ray
/// * `slope_two` - The rate slope above optimal utilization in ray
/// * `optimal_util` - The optimal utilization rate in ray
/// * `reserve_factor` - The treasury share of interest in basis points
/// * `available_liquidity` - The underlying liquidity not lent out
/// * `total_stable_debt` - The outstanding stable rate debt
/// * `total_variable_debt` - The outstanding variable rate debt
/// * `avg_stable_rate` - The weighted average stable borrow rate in ray
#[allow(clippy::too_many_arguments)]
pub fn calc_interest_rates(
    e: &Env,
    base_rate: i128,
    slope_one: i128,
    slope_two: i128,
    optimal_util: i128,
    reserve_factor: u32,
    available_liquidity: i128,
    total_stable_debt: i128,
    total_variable_debt: i128,
    avg_stable_rate: i128,
) -> (i128, i128) {
    let total_debt = total_stable_debt + total_variable_debt;
    if total_debt == 0 {
        return (0, base_rate);
    }

    let utilization = ray_div(e, total_debt, available_liquidity + total_debt);
    let borrow_rate = if utilization > optimal_util {
        let excess_util = ray_div(e, utilization - optimal_util, RAY - optimal_util);
        base_rate + slope_one + ray_mul(e, slope_two, excess_util)
    } else {
        base_rate + ray_mul(e, slope_one, ray_div(e, utilization, optimal_util))
    };

    // debt-weighted average of the variable and stable sides
    let overall_borrow_rate = mul_div_half_up(e, borrow_rate, total_variable_debt, total_debt)
        + mul_div_half_up(e, avg_stable_rate, total_stable_debt, total_debt);

    let liquidity_rate = percent_mul(
        e,
        ray_mul(e, overall_borrow_rate, utilization),
        SCALAR_BPS - i128(reserve_factor),
    );

    (liquidity_rate, borrow_rate)
}
