use soroban_sdk::{map, panic_with_error, vec, Address, Env, Map, Vec};

use sep_40_oracle::{Asset, PriceFeedClient};

use crate::{
    constants::MAX_PRICE_AGE,
    errors::PoolError,
    storage::{self, PoolConfig, ReserveKey},
};

use super::reserve::Reserve;

pub struct Pool {
    pub config: PoolConfig,
    pub reserves: Map<ReserveKey, Reserve>,
    reserves_to_store: Vec<ReserveKey>,
    price_decimals: Option<u32>,
    prices: Map<Address, i128>,
}

impl Pool {
    /// Load the Pool from the ledger
    pub fn load(e: &Env) -> Self {
        let pool_config = storage::get_pool_config(e);
        Pool {
            config: pool_config,
            reserves: map![e],
            reserves_to_store: vec![e],
            price_decimals: None,
            prices: map![e],
        }
    }

    /// Load a Reserve from the ledger and accrue it to the current ledger
    /// timestamp. Returns a cached version if it exists.
    ///
    /// ### Arguments
    /// * key - The reserve key
    pub fn load_reserve(&self, e: &Env, key: &ReserveKey) -> Reserve {
        if let Some(reserve) = self.reserves.get(key.clone()) {
            return reserve;
        }
        Reserve::load(e, key)
    }

    /// Cache the updated reserve in the pool.
    ///
    /// ### Arguments
    /// * reserve - The updated reserve
    /// * write - If the reserve needs to be written to the ledger
    pub fn cache_reserve(&mut self, reserve: Reserve, write: bool) {
        let key = reserve.key();
        if write && !self.reserves_to_store.contains(&key) {
            self.reserves_to_store.push_back(key.clone());
        }
        self.reserves.set(key, reserve);
    }

    /// Store the cached reserves to the ledger that need to be written.
    pub fn store_cached_reserves(&self, e: &Env) {
        for key in self.reserves_to_store.iter() {
            let reserve = self.reserves.get_unchecked(key);
            reserve.store(e);
        }
    }

    /// Require that the pool is not paused, or panic.
    pub fn require_not_paused(&self, e: &Env) {
        if self.config.paused {
            panic_with_error!(e, PoolError::PoolPaused);
        }
    }

    /// Load the decimals of the prices for the Pool's oracle. Returns a cached version if one
    /// already exists.
    pub fn load_price_decimals(&mut self, e: &Env) -> u32 {
        if let Some(decimals) = self.price_decimals {
            return decimals;
        }
        let oracle_client = PriceFeedClient::new(e, &self.config.oracle);
        let decimals = oracle_client.decimals();
        self.price_decimals = Some(decimals);
        decimals
    }

    /// Load a price for an asset. Returns a cached version if one already exists.
    ///
    /// The asset's price source override is preferred over the pool's oracle.
    /// If the chosen feed has no positive price for the asset, the fallback
    /// oracle is consulted before giving up.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    ///
    /// ### Panics
    /// If the price is stale or no feed can produce a positive price
    pub fn load_price(&mut self, e: &Env, asset: &Address) -> i128 {
        if let Some(price) = self.prices.get(asset.clone()) {
            return price;
        }

        let source = storage::get_price_source(e, asset).unwrap_or(self.config.oracle.clone());
        let mut price = Self::fetch_price(e, &source, asset);
        if price.is_none() {
            if let Some(fallback) = storage::get_fallback_oracle(e) {
                price = Self::fetch_price(e, &fallback, asset);
            }
        }
        match price {
            Some(price) => {
                self.prices.set(asset.clone(), price);
                price
            }
            None => panic_with_error!(e, PoolError::PriceNotAvailable),
        }
    }

    /// Fetch a price from a feed, returning None if the feed has no positive
    /// price for the asset.
    ///
    /// ### Panics
    /// If the feed's price is stale
    fn fetch_price(e: &Env, oracle: &Address, asset: &Address) -> Option<i128> {
        let oracle_client = PriceFeedClient::new(e, oracle);
        let oracle_asset = Asset::Stellar(asset.clone());
        match oracle_client.lastprice(&oracle_asset) {
            Some(price_data) => {
                if price_data.price <= 0 {
                    return None;
                }
                if price_data.timestamp + MAX_PRICE_AGE < e.ledger().timestamp() {
                    panic_with_error!(e, PoolError::StalePrice);
                }
                Some(price_data.price)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use sep_40_oracle::testutils::Asset;
    use soroban_sdk::{
        testutils::{Address as _, Ledger, LedgerInfo},
        Symbol,
    };

    use crate::{storage::ReserveData, testutils};

    use super::*;

    #[test]
    fn test_reserve_cache() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let oracle = Address::generate(&e);
        let treasury = Address::generate(&e);

        let (underlying, _) = testutils::create_token_contract(&e, &bombadil);
        let key = ReserveKey {
            asset: underlying.clone(),
            reserve_type: false,
        };
        let (reserve_config, mut reserve_data) = testutils::default_reserve_meta();
        reserve_data.b_supply = 100_0000000;
        reserve_data.d_supply = 50_0000000;
        reserve_data.underlying_bal = 50_0000000;
        testutils::create_reserve(&e, &pool, &key, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle,
            treasury,
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            let mut pool = Pool::load(&e);
            let mut reserve = pool.load_reserve(&e, &key);
            reserve.b_supply = 123_0000000;
            pool.cache_reserve(reserve.clone(), true);

            // overwrite the ledger data to ensure reads come from the cache
            storage::set_res_data(
                &e,
                &key,
                &ReserveData {
                    liquidity_index: 0,
                    borrow_index: 0,
                    liquidity_rate: 0,
                    borrow_rate: 0,
                    b_supply: 0,
                    d_supply: 0,
                    treasury_supply: 0,
                    underlying_bal: 0,
                    farming_bal: 0,
                    last_time: 0,
                },
            );

            let cached_reserve = pool.load_reserve(&e, &key);
            assert_eq!(cached_reserve.b_supply, 123_0000000);

            // store all cached reserves and verify the data is updated
            pool.store_cached_reserves(&e);
            let stored = storage::get_res_data(&e, &key);
            assert_eq!(stored.b_supply, 123_0000000);
        });
    }

    #[test]
    fn test_reserve_cache_stores_only_marked() {
        let e = Env::default();
        e.mock_all_auths();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let oracle = Address::generate(&e);
        let treasury = Address::generate(&e);

        let (underlying_0, _) = testutils::create_token_contract(&e, &bombadil);
        let key_0 = ReserveKey {
            asset: underlying_0.clone(),
            reserve_type: false,
        };
        let (reserve_config, reserve_data) = testutils::default_reserve_meta();
        testutils::create_reserve(&e, &pool, &key_0, &reserve_config, &reserve_data);

        let (underlying_1, _) = testutils::create_token_contract(&e, &bombadil);
        let key_1 = ReserveKey {
            asset: underlying_1.clone(),
            reserve_type: false,
        };
        let (mut reserve_config, reserve_data) = testutils::default_reserve_meta();
        reserve_config.index = 1;
        testutils::create_reserve(&e, &pool, &key_1, &reserve_config, &reserve_data);

        let pool_config = PoolConfig {
            oracle,
            treasury,
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            let mut pool = Pool::load(&e);

            let mut reserve_0 = pool.load_reserve(&e, &key_0);
            reserve_0.b_supply = 456_0000000;
            pool.cache_reserve(reserve_0, true);

            let mut reserve_1 = pool.load_reserve(&e, &key_1);
            reserve_1.b_supply = 789_0000000;
            pool.cache_reserve(reserve_1, false);

            pool.store_cached_reserves(&e);
            let stored_0 = storage::get_res_data(&e, &key_0);
            assert_eq!(stored_0.b_supply, 456_0000000);
            let stored_1 = storage::get_res_data(&e, &key_1);
            assert_eq!(stored_1.b_supply, 0);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1208)")]
    fn test_require_not_paused_panics() {
        let e = Env::default();

        let pool = testutils::create_pool(&e);
        let pool_config = PoolConfig {
            oracle: Address::generate(&e),
            treasury: Address::generate(&e),
            paused: true,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            let pool = Pool::load(&e);

            pool.require_not_paused(&e);
        });
    }

    #[test]
    fn test_load_price_decimals() {
        let e = Env::default();
        e.mock_all_auths();

        let pool = testutils::create_pool(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        oracle_client.set_data(
            &Address::generate(&e),
            &Asset::Stellar(Address::generate(&e)),
            &vec![&e, Asset::Stellar(Address::generate(&e))],
            &7,
            &300,
        );
        let pool_config = PoolConfig {
            oracle,
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            let mut pool = Pool::load(&e);

            let decimals = pool.load_price_decimals(&e);
            assert_eq!(decimals, 7);
        });
    }

    #[test]
    fn test_load_price() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let asset_0 = Address::generate(&e);
        let asset_1 = Address::generate(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![
                &e,
                Asset::Stellar(asset_0.clone()),
                Asset::Stellar(asset_1.clone()),
            ],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 123, 456]);

        let pool_config = PoolConfig {
            oracle,
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            let mut pool = Pool::load(&e);

            let price = pool.load_price(&e, &asset_0);
            assert_eq!(price, 123);

            let price = pool.load_price(&e, &asset_1);
            assert_eq!(price, 456);

            // verify the price is cached
            oracle_client.set_price_stable(&vec![&e, 789, 101112]);
            let price = pool.load_price(&e, &asset_0);
            assert_eq!(price, 123);
        });
    }

    #[test]
    fn test_load_price_uses_source_override() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let asset = Address::generate(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        let (override_oracle, override_client) = testutils::create_mock_oracle(&e);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(asset.clone())],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 123]);
        override_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(asset.clone())],
            &7,
            &300,
        );
        override_client.set_price_stable(&vec![&e, 999]);

        let pool_config = PoolConfig {
            oracle,
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            storage::set_price_source(&e, &asset, &override_oracle);
            let mut pool = Pool::load(&e);

            let price = pool.load_price(&e, &asset);
            assert_eq!(price, 999);
        });
    }

    #[test]
    fn test_load_price_falls_back() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let asset = Address::generate(&e);
        let other_asset = Address::generate(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        let (fallback, fallback_client) = testutils::create_mock_oracle(&e);

        // primary oracle does not track the asset
        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(other_asset.clone())],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 123]);
        fallback_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(asset.clone())],
            &7,
            &300,
        );
        fallback_client.set_price_stable(&vec![&e, 777]);

        let pool_config = PoolConfig {
            oracle,
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            storage::set_fallback_oracle(&e, &fallback);
            let mut pool = Pool::load(&e);

            let price = pool.load_price(&e, &asset);
            assert_eq!(price, 777);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1215)")]
    fn test_load_price_panics_if_unavailable() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let asset = Address::generate(&e);
        let other_asset = Address::generate(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);

        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(other_asset.clone())],
            &7,
            &300,
        );
        oracle_client.set_price_stable(&vec![&e, 123]);

        let pool_config = PoolConfig {
            oracle,
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            let mut pool = Pool::load(&e);

            pool.load_price(&e, &asset);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1214)")]
    fn test_load_price_panics_if_stale() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        e.ledger().set(LedgerInfo {
            timestamp: 1000 + 24 * 60 * 60 + 1,
            protocol_version: 20,
            sequence_number: 1234,
            network_id: Default::default(),
            base_reserve: 10,
            min_temp_entry_ttl: 10,
            min_persistent_entry_ttl: 10,
            max_entry_ttl: 2000000,
        });

        let bombadil = Address::generate(&e);
        let pool = testutils::create_pool(&e);
        let asset = Address::generate(&e);
        let (oracle, oracle_client) = testutils::create_mock_oracle(&e);
        oracle_client.set_data(
            &bombadil,
            &Asset::Other(Symbol::new(&e, "USD")),
            &vec![&e, Asset::Stellar(asset.clone())],
            &7,
            &300,
        );
        oracle_client.set_price(&vec![&e, 123], &1000);
        let pool_config = PoolConfig {
            oracle,
            treasury: Address::generate(&e),
            paused: false,
        };
        e.as_contract(&pool, || {
            storage::set_pool_config(&e, &pool_config);
            let mut pool = Pool::load(&e);

            pool.load_price(&e, &asset);
        });
    }
}
