#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Runtime: simulated chain and the development network built on it.

pub mod chain;
pub mod devnet;
