use soroban_sdk::{panic_with_error, Env, I256};

use crate::{
    constants::{RAY, SCALAR_BPS},
    errors::PoolError,
};

/// Compute `x * y / denominator` with half-up rounding using 256-bit intermediates.
///
/// All inputs must be non-negative and the denominator must be non-zero.
///
/// ### Panics
/// If the result does not fit in an i128 or an input is invalid
pub fn mul_div_half_up(e: &Env, x: i128, y: i128, denominator: i128) -> i128 {
    if x < 0 || y < 0 || denominator <= 0 {
        panic_with_error!(e, PoolError::OverflowError);
    }
    let product = I256::from_i128(e, x).mul(&I256::from_i128(e, y));
    let result = product
        .add(&I256::from_i128(e, denominator / 2))
        .div(&I256::from_i128(e, denominator));
    match result.to_i128() {
        Some(value) => value,
        None => panic_with_error!(e, PoolError::OverflowError),
    }
}

/// Multiply two ray scaled values, rounding half-up
pub fn ray_mul(e: &Env, x: i128, y: i128) -> i128 {
    mul_div_half_up(e, x, y, RAY)
}

/// Divide two ray scaled values, rounding half-up
pub fn ray_div(e: &Env, x: i128, y: i128) -> i128 {
    mul_div_half_up(e, x, RAY, y)
}

/// Take a basis point percentage of a value, rounding half-up
pub fn percent_mul(e: &Env, value: i128, bps: i128) -> i128 {
    mul_div_half_up(e, value, bps, SCALAR_BPS)
}

/// Divide a value by a basis point percentage, rounding half-up
pub fn percent_div(e: &Env, value: i128, bps: i128) -> i128 {
    mul_div_half_up(e, value, SCALAR_BPS, bps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_mul() {
        let e = Env::default();

        assert_eq!(ray_mul(&e, RAY, RAY), RAY);
        assert_eq!(ray_mul(&e, 5, RAY / 2), 3); // 2.5 rounds up
        assert_eq!(ray_mul(&e, 4, RAY / 2), 2);
        assert_eq!(ray_mul(&e, 0, RAY), 0);
    }

    #[test]
    fn test_ray_mul_large_intermediate() {
        let e = Env::default();

        // product exceeds i128::MAX, result does not
        let x = 100_000_000_000_000_000_000_000_000_000_000_000_000; // 1e38
        let result = ray_mul(&e, x, RAY / 100);
        assert_eq!(result, x / 100);
    }

    #[test]
    fn test_ray_div() {
        let e = Env::default();

        assert_eq!(ray_div(&e, 10, RAY * 4), 3); // 2.5 rounds up
        assert_eq!(ray_div(&e, RAY, RAY), RAY);
        assert_eq!(ray_div(&e, 1, 2 * RAY), 1); // 0.5 rounds up
    }

    #[test]
    fn test_percent_math() {
        let e = Env::default();

        assert_eq!(percent_mul(&e, 1_000_0000000, 0_5000), 500_0000000);
        assert_eq!(percent_mul(&e, 1, 0_5000), 1); // 0.5 rounds up
        assert_eq!(percent_div(&e, 500_0000000, 0_5000), 1_000_0000000);
        assert_eq!(percent_mul(&e, 100_0000000, 1_0500), 105_0000000);
        assert_eq!(percent_div(&e, 105_0000000, 1_0500), 100_0000000);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #12)")]
    fn test_mul_div_half_up_overflow() {
        let e = Env::default();

        mul_div_half_up(&e, i128::MAX, i128::MAX, 1);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #12)")]
    fn test_mul_div_half_up_negative() {
        let e = Env::default();

        mul_div_half_up(&e, -1, RAY, RAY);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #12)")]
    fn test_mul_div_half_up_zero_denominator() {
        let e = Env::default();

        mul_div_half_up(&e, 1, 1, 0);
    }
}
