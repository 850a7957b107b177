use sep_41_token::TokenClient;
use soroban_sdk::{contract, contractimpl, contracttype, unwrap::UnwrapOptimized, Address, Env, Symbol};

const TOKEN_KEY: &str = "Token";
const LIMIT_KEY: &str = "Limit";

#[derive(Clone)]
#[contracttype]
pub enum VaultDataKey {
    // The tracked asset balance for a depositor
    Assets(Address),
}

/// A mock yield vault. Deposits are recorded after the tokens arrive, and
/// yield is credited explicitly with `accrue`.
#[contract]
pub struct MockYieldVault;

#[contractimpl]
impl MockYieldVault {
    pub fn initialize(e: Env, token: Address) {
        e.storage()
            .instance()
            .set(&Symbol::new(&e, TOKEN_KEY), &token);
    }

    /// Record a deposit of "amount" tokens already transferred to the vault
    pub fn deposit(e: Env, from: Address, amount: i128) -> i128 {
        let key = VaultDataKey::Assets(from);
        let balance: i128 = e.storage().persistent().get(&key).unwrap_or(0);
        let new_balance = balance + amount;
        e.storage().persistent().set(&key, &new_balance);
        new_balance
    }

    /// Redeem "amount" tokens from "to"'s tracked balance and transfer them out
    pub fn withdraw(e: Env, to: Address, amount: i128) -> i128 {
        let key = VaultDataKey::Assets(to.clone());
        let balance: i128 = e.storage().persistent().get(&key).unwrap_or(0);
        let new_balance = balance - amount;
        e.storage().persistent().set(&key, &new_balance);

        let token: Address = e
            .storage()
            .instance()
            .get(&Symbol::new(&e, TOKEN_KEY))
            .unwrap_optimized();
        TokenClient::new(&e, &token).transfer(&e.current_contract_address(), &to, &amount);
        new_balance
    }

    /// The most "owner" can withdraw, bounded by the configured limit
    pub fn max_withdraw(e: Env, owner: Address) -> i128 {
        let balance = Self::assets_of(e.clone(), owner);
        match e
            .storage()
            .instance()
            .get::<Symbol, i128>(&Symbol::new(&e, LIMIT_KEY))
        {
            Some(limit) => balance.min(limit),
            None => balance,
        }
    }

    /// The tracked asset balance for "owner"
    pub fn assets_of(e: Env, owner: Address) -> i128 {
        e.storage()
            .persistent()
            .get(&VaultDataKey::Assets(owner))
            .unwrap_or(0)
    }

    /// The underlying tokens the vault holds
    pub fn total_assets(e: Env) -> i128 {
        let token: Address = e
            .storage()
            .instance()
            .get(&Symbol::new(&e, TOKEN_KEY))
            .unwrap_optimized();
        TokenClient::new(&e, &token).balance(&e.current_contract_address())
    }

    /// Test helper. Credit "amount" of yield to "owner"'s tracked balance.
    /// The matching tokens must be minted to the vault separately.
    pub fn accrue(e: Env, owner: Address, amount: i128) {
        let key = VaultDataKey::Assets(owner);
        let balance: i128 = e.storage().persistent().get(&key).unwrap_or(0);
        e.storage().persistent().set(&key, &(balance + amount));
    }

    /// Test helper. Cap the amount any owner can withdraw.
    pub fn set_withdraw_limit(e: Env, limit: i128) {
        e.storage()
            .instance()
            .set(&Symbol::new(&e, LIMIT_KEY), &limit);
    }
}
