#![no_std]

mod contract;
pub use contract::{MockYieldVault, MockYieldVaultClient};
