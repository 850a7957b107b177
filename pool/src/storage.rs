use soroban_sdk::{
    contracttype, panic_with_error, unwrap::UnwrapOptimized, vec, Address, Env, IntoVal, Symbol,
    TryFromVal, Val, Vec,
};

use crate::{pool::Positions, PoolError};

pub(crate) const LEDGER_THRESHOLD_SHARED: u32 = 172800; // ~ 10 days
pub(crate) const LEDGER_BUMP_SHARED: u32 = 241920; // ~ 14 days

pub(crate) const LEDGER_THRESHOLD_USER: u32 = 518400; // ~ 30 days
pub(crate) const LEDGER_BUMP_USER: u32 = 535670; // ~ 31 days

/********** Storage Types **********/

/// The pool's config
#[derive(Clone)]
#[contracttype]
pub struct PoolConfig {
    pub oracle: Address,   // the default price feed for the pool's reserves
    pub treasury: Address, // the recipient of the reserve factor share of interest
    pub paused: bool,      // whether ledger-changing operations are halted
}

/// Identifies a reserve. The same underlying asset can back two independent
/// reserves, one per type flag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct ReserveKey {
    pub asset: Address,     // the underlying asset contract
    pub reserve_type: bool, // the reserve flavor for the asset
}

/// The configuration information about a reserve
#[derive(Clone)]
#[contracttype]
pub struct ReserveConfig {
    pub index: u32,              // the index of the reserve in the list
    pub decimals: u32,           // the decimals of the underlying contract
    pub ltv: u32,                // the loan-to-value ratio in basis points
    pub liq_threshold: u32,      // the liquidation threshold in basis points
    pub liq_bonus: u32,          // the liquidation bonus in basis points (>= 10000)
    pub reserve_factor: u32,     // the portion of interest routed to the treasury in basis points
    pub base_rate: i128,         // the base borrow rate in ray
    pub slope_one: i128,         // the rate slope below optimal utilization in ray
    pub slope_two: i128,         // the rate slope above optimal utilization in ray
    pub optimal_util: i128,      // the optimal utilization rate in ray
    pub active: bool,            // whether the reserve accepts any operations
    pub frozen: bool,            // whether deposits and borrows are halted
    pub borrow_enabled: bool,    // whether the reserve can be borrowed from
    pub collateral_enabled: bool, // whether deposits can back debt
}

/// The data for a reserve
#[derive(Clone)]
#[contracttype]
pub struct ReserveData {
    pub liquidity_index: i128, // the cumulative supply-side interest index in ray
    pub borrow_index: i128,    // the cumulative borrow-side interest index in ray
    pub liquidity_rate: i128,  // the current supply-side rate in ray
    pub borrow_rate: i128,     // the current borrow-side rate in ray
    pub b_supply: i128,        // the total scaled supply balance
    pub d_supply: i128,        // the total scaled debt balance
    pub treasury_supply: i128, // the scaled supply balance accrued to the treasury
    pub underlying_bal: i128,  // underlying tokens held directly by the pool for this reserve
    pub farming_bal: i128,     // underlying tokens placed in the reserve's yield vault
    pub last_time: u64,        // the last timestamp the indices were updated
}

/// The rehypothecation configuration for a reserve
#[derive(Clone)]
#[contracttype]
pub struct FarmingConfig {
    pub vault: Address,           // the yield vault liquidity is placed into
    pub farming_pct: u32,         // the target share of managed assets to farm, in basis points
    pub drift: u32,               // the rebalance dead band around the target, in basis points
    pub claiming_threshold: i128, // the minimum profit worth claiming, in underlying tokens
    pub profit_handler: Address,  // the recipient of claimed yield
}

/// A reserve and its initial configuration, used for batched reserve setup
#[derive(Clone)]
#[contracttype]
pub struct ReserveInit {
    pub key: ReserveKey,
    pub metadata: ReserveConfig,
}

/********** Storage Key Types **********/

const ADMIN_KEY: &str = "Admin";
const NAME_KEY: &str = "Name";
const POOL_CONFIG_KEY: &str = "Config";
const FALLBACK_ORACLE_KEY: &str = "Fallback";
const RES_LIST_KEY: &str = "ResList";

#[derive(Clone)]
#[contracttype]
pub enum PoolDataKey {
    // A map of reserve key to reserve config
    ResConfig(ReserveKey),
    // A map of reserve key to reserve data
    ResData(ReserveKey),
    // Map of positions in the pool for a user
    Positions(Address),
    // The rehypothecation config for a reserve
    Farming(ReserveKey),
    // A price feed override for an asset
    PriceSource(Address),
    // Reentrancy lock for a reserve, held over flash loan call-outs
    ResLock(ReserveKey),
}

/********** Storage **********/

/// Bump the instance rent for the contract
pub fn extend_instance(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/// Fetch an entry in persistent storage that has a default value if it doesn't exist
fn get_persistent_default<K: IntoVal<Env, Val>, V: TryFromVal<Env, Val>>(
    e: &Env,
    key: &K,
    default: V,
    bump_threshold: u32,
    bump_amount: u32,
) -> V {
    if let Some(result) = e.storage().persistent().get::<K, V>(key) {
        e.storage()
            .persistent()
            .extend_ttl(key, bump_threshold, bump_amount);
        result
    } else {
        default
    }
}

/********** User **********/

/// Fetch the user's positions or return an empty Positions struct
///
/// ### Arguments
/// * `user` - The address of the user
pub fn get_user_positions(e: &Env, user: &Address) -> Positions {
    let key = PoolDataKey::Positions(user.clone());
    get_persistent_default(
        e,
        &key,
        Positions::env_default(e),
        LEDGER_THRESHOLD_USER,
        LEDGER_BUMP_USER,
    )
}

/// Set the user's positions
///
/// ### Arguments
/// * `user` - The address of the user
/// * `positions` - The new positions for the user
pub fn set_user_positions(e: &Env, user: &Address, positions: &Positions) {
    let key = PoolDataKey::Positions(user.clone());
    e.storage()
        .persistent()
        .set::<PoolDataKey, Positions>(&key, positions);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
}

/********** Admin **********/

/// Fetch the current admin Address
///
/// ### Panics
/// If the admin does not exist
pub fn get_admin(e: &Env) -> Address {
    e.storage()
        .instance()
        .get(&Symbol::new(e, ADMIN_KEY))
        .unwrap_optimized()
}

/// Set a new admin
///
/// ### Arguments
/// * `new_admin` - The Address for the admin
pub fn set_admin(e: &Env, new_admin: &Address) {
    e.storage()
        .instance()
        .set::<Symbol, Address>(&Symbol::new(e, ADMIN_KEY), new_admin);
}

/// Checks if an admin is set
pub fn has_admin(e: &Env) -> bool {
    e.storage().instance().has(&Symbol::new(e, ADMIN_KEY))
}

/********** Metadata **********/

/// Set a pool name
///
/// ### Arguments
/// * `name` - The Name of the pool
pub fn set_name(e: &Env, name: &Symbol) {
    e.storage()
        .instance()
        .set::<Symbol, Symbol>(&Symbol::new(e, NAME_KEY), name);
}

/********** Pool Config **********/

/// Fetch the pool configuration
///
/// ### Panics
/// If the pool's config is not set
pub fn get_pool_config(e: &Env) -> PoolConfig {
    e.storage()
        .instance()
        .get(&Symbol::new(e, POOL_CONFIG_KEY))
        .unwrap_optimized()
}

/// Set the pool configuration
///
/// ### Arguments
/// * `config` - The pool configuration
pub fn set_pool_config(e: &Env, config: &PoolConfig) {
    e.storage()
        .instance()
        .set::<Symbol, PoolConfig>(&Symbol::new(e, POOL_CONFIG_KEY), config);
}

/********** Oracle **********/

/// Fetch the fallback oracle, if one is set
pub fn get_fallback_oracle(e: &Env) -> Option<Address> {
    e.storage()
        .instance()
        .get(&Symbol::new(e, FALLBACK_ORACLE_KEY))
}

/// Set the fallback oracle
///
/// ### Arguments
/// * `oracle` - The address of the fallback price feed
pub fn set_fallback_oracle(e: &Env, oracle: &Address) {
    e.storage()
        .instance()
        .set::<Symbol, Address>(&Symbol::new(e, FALLBACK_ORACLE_KEY), oracle);
}

/// Fetch the price feed override for an asset, if one is set
///
/// ### Arguments
/// * `asset` - The contract address of the asset
pub fn get_price_source(e: &Env, asset: &Address) -> Option<Address> {
    let key = PoolDataKey::PriceSource(asset.clone());
    if let Some(source) = e.storage().persistent().get::<PoolDataKey, Address>(&key) {
        e.storage()
            .persistent()
            .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
        Some(source)
    } else {
        None
    }
}

/// Set a price feed override for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
/// * `source` - The price feed to use for the asset
pub fn set_price_source(e: &Env, asset: &Address, source: &Address) {
    let key = PoolDataKey::PriceSource(asset.clone());
    e.storage()
        .persistent()
        .set::<PoolDataKey, Address>(&key, source);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Reserve Config (ResConfig) **********/

/// Fetch the reserve config for a reserve
///
/// ### Arguments
/// * `key` - The reserve key
///
/// ### Panics
/// If the reserve does not exist
pub fn get_res_config(e: &Env, key: &ReserveKey) -> ReserveConfig {
    let data_key = PoolDataKey::ResConfig(key.clone());
    e.storage()
        .persistent()
        .extend_ttl(&data_key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<PoolDataKey, ReserveConfig>(&data_key)
        .unwrap_optimized()
}

/// Set the reserve configuration for a reserve
///
/// ### Arguments
/// * `key` - The reserve key
/// * `config` - The reserve configuration
pub fn set_res_config(e: &Env, key: &ReserveKey, config: &ReserveConfig) {
    let data_key = PoolDataKey::ResConfig(key.clone());
    e.storage()
        .persistent()
        .set::<PoolDataKey, ReserveConfig>(&data_key, config);
    e.storage()
        .persistent()
        .extend_ttl(&data_key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/// Checks if a reserve exists
///
/// ### Arguments
/// * `key` - The reserve key
pub fn has_res(e: &Env, key: &ReserveKey) -> bool {
    let data_key = PoolDataKey::ResConfig(key.clone());
    e.storage().persistent().has(&data_key)
}

/********** Reserve Data (ResData) **********/

/// Fetch the reserve data for a reserve
///
/// ### Arguments
/// * `key` - The reserve key
///
/// ### Panics
/// If the reserve does not exist
pub fn get_res_data(e: &Env, key: &ReserveKey) -> ReserveData {
    let data_key = PoolDataKey::ResData(key.clone());
    e.storage()
        .persistent()
        .extend_ttl(&data_key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<PoolDataKey, ReserveData>(&data_key)
        .unwrap_optimized()
}

/// Set the reserve data for a reserve
///
/// ### Arguments
/// * `key` - The reserve key
/// * `data` - The reserve data
pub fn set_res_data(e: &Env, key: &ReserveKey, data: &ReserveData) {
    let data_key = PoolDataKey::ResData(key.clone());
    e.storage()
        .persistent()
        .set::<PoolDataKey, ReserveData>(&data_key, data);
    e.storage()
        .persistent()
        .extend_ttl(&data_key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Reserve List (ResList) **********/

/// Fetch the list of reserves
pub fn get_res_list(e: &Env) -> Vec<ReserveKey> {
    get_persistent_default(
        e,
        &Symbol::new(e, RES_LIST_KEY),
        vec![e],
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    )
}

/// Add a reserve to the back of the list and returns the index
///
/// ### Arguments
/// * `key` - The reserve key
///
/// ### Panics
/// If the number of reserves in the list exceeds 32
///
// @dev: Once added it can't be removed
pub fn push_res_list(e: &Env, key: &ReserveKey) -> u32 {
    let mut res_list = get_res_list(e);
    if res_list.len() == 32 {
        panic_with_error!(e, PoolError::BadRequest)
    }
    res_list.push_back(key.clone());
    let new_index = res_list.len() - 1;
    e.storage()
        .persistent()
        .set::<Symbol, Vec<ReserveKey>>(&Symbol::new(e, RES_LIST_KEY), &res_list);
    e.storage().persistent().extend_ttl(
        &Symbol::new(e, RES_LIST_KEY),
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    );
    new_index
}

/********** Farming **********/

/// Fetch the rehypothecation config for a reserve, if one is set
///
/// ### Arguments
/// * `key` - The reserve key
pub fn get_farming_config(e: &Env, key: &ReserveKey) -> Option<FarmingConfig> {
    let data_key = PoolDataKey::Farming(key.clone());
    if let Some(config) = e
        .storage()
        .persistent()
        .get::<PoolDataKey, FarmingConfig>(&data_key)
    {
        e.storage()
            .persistent()
            .extend_ttl(&data_key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
        Some(config)
    } else {
        None
    }
}

/// Set the rehypothecation config for a reserve
///
/// ### Arguments
/// * `key` - The reserve key
/// * `config` - The rehypothecation config
pub fn set_farming_config(e: &Env, key: &ReserveKey, config: &FarmingConfig) {
    let data_key = PoolDataKey::Farming(key.clone());
    e.storage()
        .persistent()
        .set::<PoolDataKey, FarmingConfig>(&data_key, config);
    e.storage()
        .persistent()
        .extend_ttl(&data_key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Reserve Lock **********/

/// Lock a reserve against reentrant ledger operations
///
/// ### Arguments
/// * `key` - The reserve key
pub fn set_res_lock(e: &Env, key: &ReserveKey) {
    let data_key = PoolDataKey::ResLock(key.clone());
    e.storage().temporary().set::<PoolDataKey, bool>(&data_key, &true);
}

/// Release the lock on a reserve
///
/// ### Arguments
/// * `key` - The reserve key
pub fn del_res_lock(e: &Env, key: &ReserveKey) {
    let data_key = PoolDataKey::ResLock(key.clone());
    e.storage().temporary().remove(&data_key);
}

/// Require that a reserve is not locked, or panic
///
/// ### Arguments
/// * `key` - The reserve key
pub fn require_res_unlocked(e: &Env, key: &ReserveKey) {
    let data_key = PoolDataKey::ResLock(key.clone());
    if e.storage().temporary().has(&data_key) {
        panic_with_error!(e, PoolError::ReserveLocked);
    }
}
