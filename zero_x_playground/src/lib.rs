pub mod config;
pub mod error;
pub mod evm;
pub mod routers;
#[cfg(test)]
pub mod tests;
pub mod utils;
