#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Lottery contract: staking rounds resolved by oracle randomness.

pub mod round;

pub use round::{LotteryError, LotteryEvent, LotteryParams, LotteryState, RoundManager};
