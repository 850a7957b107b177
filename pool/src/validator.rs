use soroban_sdk::{panic_with_error, Env};

use crate::errors::PoolError;

/// Require that an amount is non-negative, or panic
///
/// ### Arguments
/// * `amount` - The amount to check
pub fn require_nonnegative(e: &Env, amount: &i128) {
    if amount.is_negative() {
        panic_with_error!(e, PoolError::NegativeAmountError);
    }
}

/// Require that an amount is strictly positive, or panic
///
/// ### Arguments
/// * `amount` - The amount to check
pub fn require_positive(e: &Env, amount: &i128) {
    if *amount <= 0 {
        panic_with_error!(e, PoolError::InvalidAmount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_nonnegative_allows_zero() {
        let e = Env::default();
        require_nonnegative(&e, &0);
        require_nonnegative(&e, &1);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #8)")]
    fn test_require_nonnegative_panics() {
        let e = Env::default();
        require_nonnegative(&e, &-1);
    }

    #[test]
    fn test_require_positive() {
        let e = Env::default();
        require_positive(&e, &1);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1203)")]
    fn test_require_positive_panics_on_zero() {
        let e = Env::default();
        require_positive(&e, &0);
    }
}
