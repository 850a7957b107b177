mod borrow;
pub use borrow::execute_borrow;

mod collateral;
pub use collateral::execute_set_collateral;

mod config;
pub use config::{
    execute_initialize, execute_init_reserves, execute_set_fallback_oracle,
    execute_set_pause, execute_set_price_source, execute_update_reserve,
};

mod farming;
pub use farming::{
    execute_claim_treasury, execute_rebalance, execute_set_farming_config, total_managed_assets,
};

mod flash_loan;
pub use flash_loan::execute_flash_loan;

mod health_factor;
pub use health_factor::{AccountData, PositionData};

mod interest;

mod liquidation;
pub use liquidation::execute_liquidation;

#[allow(clippy::module_inception)]
mod pool;
pub use pool::Pool;

mod repay;
pub use repay::execute_repay;

mod reserve;
pub use reserve::Reserve;

mod supply;
pub use supply::execute_deposit;

mod transfer;
pub use transfer::execute_transfer_supply;

mod user;
pub use user::{Positions, User};

mod withdrawal;
pub use withdrawal::execute_withdraw;
