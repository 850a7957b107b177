#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod constants;
mod contract;
mod dependencies;
mod errors;
mod math;
mod pool;
mod storage;
mod testutils;
mod validator;

pub use contract::*;
pub use errors::PoolError;
pub use pool::{AccountData, Positions, Reserve};
pub use storage::{
    FarmingConfig, PoolConfig, ReserveConfig, ReserveData, ReserveInit, ReserveKey,
};
