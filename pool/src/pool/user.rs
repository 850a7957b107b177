use soroban_sdk::{contracttype, Address, Env, Map};

use crate::{storage, validator::require_nonnegative};

use super::Reserve;

/// A user / contract's positions with the pool, stored as scaled balances
#[derive(Clone)]
#[contracttype]
pub struct Positions {
    pub liabilities: Map<u32, i128>, // Map of reserve index to scaled debt balance
    pub collateral: Map<u32, i128>,  // Map of reserve index to scaled collateral supply balance
    pub supply: Map<u32, i128>,      // Map of reserve index to scaled non-collateral supply balance
}

impl Positions {
    /// Create an empty Positions object in the environment
    pub fn env_default(e: &Env) -> Self {
        Positions {
            liabilities: Map::new(e),
            collateral: Map::new(e),
            supply: Map::new(e),
        }
    }

    /// Whether the positions hold any debt
    pub fn has_liabilities(&self) -> bool {
        !self.liabilities.is_empty()
    }
}

/// A user / contract's positions with the pool
#[derive(Clone)]
pub struct User {
    pub address: Address,
    pub positions: Positions,
}

impl User {
    /// Load the user's positions from the ledger
    pub fn load(e: &Env, address: &Address) -> Self {
        User {
            address: address.clone(),
            positions: storage::get_user_positions(e, address),
        }
    }

    /// Store the user's positions to the ledger
    pub fn store(&self, e: &Env) {
        storage::set_user_positions(e, &self.address, &self.positions);
    }

    /// Get the scaled debt position for the reserve at the given index
    pub fn get_liabilities(&self, reserve_index: u32) -> i128 {
        self.positions.liabilities.get(reserve_index).unwrap_or(0)
    }

    /// Add scaled debt to the position and update the reserve's d_supply
    pub fn add_liabilities(&mut self, reserve: &mut Reserve, amount: i128) {
        let balance = self.get_liabilities(reserve.index);
        self.positions
            .liabilities
            .set(reserve.index, balance + amount);
        reserve.d_supply += amount;
    }

    /// Remove scaled debt from the position and update the reserve's d_supply
    pub fn remove_liabilities(&mut self, e: &Env, reserve: &mut Reserve, amount: i128) {
        let balance = self.get_liabilities(reserve.index);
        let new_balance = balance - amount;
        require_nonnegative(e, &new_balance);
        if new_balance == 0 {
            self.positions.liabilities.remove(reserve.index);
        } else {
            self.positions.liabilities.set(reserve.index, new_balance);
        }
        reserve.d_supply -= amount;
    }

    /// Get the scaled collateral supply position for the reserve at the given index
    pub fn get_collateral(&self, reserve_index: u32) -> i128 {
        self.positions.collateral.get(reserve_index).unwrap_or(0)
    }

    /// Add scaled collateral to the position and update the reserve's b_supply
    pub fn add_collateral(&mut self, reserve: &mut Reserve, amount: i128) {
        let balance = self.get_collateral(reserve.index);
        self.positions
            .collateral
            .set(reserve.index, balance + amount);
        reserve.b_supply += amount;
    }

    /// Remove scaled collateral from the position and update the reserve's b_supply
    pub fn remove_collateral(&mut self, e: &Env, reserve: &mut Reserve, amount: i128) {
        let balance = self.get_collateral(reserve.index);
        let new_balance = balance - amount;
        require_nonnegative(e, &new_balance);
        if new_balance == 0 {
            self.positions.collateral.remove(reserve.index);
        } else {
            self.positions.collateral.set(reserve.index, new_balance);
        }
        reserve.b_supply -= amount;
    }

    /// Get the scaled non-collateral supply position for the reserve at the given index
    pub fn get_supply(&self, reserve_index: u32) -> i128 {
        self.positions.supply.get(reserve_index).unwrap_or(0)
    }

    /// Add scaled supply to the position and update the reserve's b_supply
    pub fn add_supply(&mut self, reserve: &mut Reserve, amount: i128) {
        let balance = self.get_supply(reserve.index);
        self.positions.supply.set(reserve.index, balance + amount);
        reserve.b_supply += amount;
    }

    /// Remove scaled supply from the position and update the reserve's b_supply
    pub fn remove_supply(&mut self, e: &Env, reserve: &mut Reserve, amount: i128) {
        let balance = self.get_supply(reserve.index);
        let new_balance = balance - amount;
        require_nonnegative(e, &new_balance);
        if new_balance == 0 {
            self.positions.supply.remove(reserve.index);
        } else {
            self.positions.supply.set(reserve.index, new_balance);
        }
        reserve.b_supply -= amount;
    }

    /// Get the total scaled supply and collateral for the user at the given index
    pub fn get_total_supply(&self, reserve_index: u32) -> i128 {
        self.get_collateral(reserve_index) + self.get_supply(reserve_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn test_liabilities_tracking() {
        let e = Env::default();
        let samwise = Address::generate(&e);
        let mut reserve = testutils::default_reserve(&e);

        let mut user = User {
            address: samwise.clone(),
            positions: Positions::env_default(&e),
        };

        user.add_liabilities(&mut reserve, 100);
        assert_eq!(user.get_liabilities(reserve.index), 100);
        assert_eq!(reserve.d_supply, 100);

        user.add_liabilities(&mut reserve, 25);
        assert_eq!(user.get_liabilities(reserve.index), 125);
        assert_eq!(reserve.d_supply, 125);

        user.remove_liabilities(&e, &mut reserve, 125);
        assert_eq!(user.get_liabilities(reserve.index), 0);
        assert_eq!(user.positions.liabilities.len(), 0);
        assert_eq!(reserve.d_supply, 0);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #8)")]
    fn test_remove_liabilities_over_balance_panics() {
        let e = Env::default();
        let samwise = Address::generate(&e);
        let mut reserve = testutils::default_reserve(&e);

        let mut user = User {
            address: samwise.clone(),
            positions: Positions::env_default(&e),
        };

        user.add_liabilities(&mut reserve, 100);
        user.remove_liabilities(&e, &mut reserve, 101);
    }

    #[test]
    fn test_collateral_and_supply_tracking() {
        let e = Env::default();
        let samwise = Address::generate(&e);
        let mut reserve = testutils::default_reserve(&e);

        let mut user = User {
            address: samwise.clone(),
            positions: Positions::env_default(&e),
        };

        user.add_collateral(&mut reserve, 100);
        user.add_supply(&mut reserve, 50);
        assert_eq!(user.get_collateral(reserve.index), 100);
        assert_eq!(user.get_supply(reserve.index), 50);
        assert_eq!(user.get_total_supply(reserve.index), 150);
        assert_eq!(reserve.b_supply, 150);

        user.remove_collateral(&e, &mut reserve, 100);
        assert_eq!(user.positions.collateral.len(), 0);
        user.remove_supply(&e, &mut reserve, 25);
        assert_eq!(user.get_supply(reserve.index), 25);
        assert_eq!(reserve.b_supply, 25);
    }

    #[test]
    fn test_store_and_load() {
        let e = Env::default();
        let samwise = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let mut reserve = testutils::default_reserve(&e);

        e.as_contract(&pool, || {
            let mut user = User::load(&e, &samwise);
            user.add_collateral(&mut reserve, 123);
            user.store(&e);

            let reloaded = User::load(&e, &samwise);
            assert_eq!(reloaded.get_collateral(reserve.index), 123);
        });
    }
}
