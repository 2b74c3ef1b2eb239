#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Automation: upkeep keeper and interval block miner.

pub mod keeper;

pub use keeper::{spawn_keeper, spawn_miner, Keeper};
