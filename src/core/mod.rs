#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Core: primitives, contracts, simulated chain, automation and deployment state.

pub mod automation;
pub mod config;
pub mod lottery;
pub mod oracle;
pub mod runtime;
pub mod state;
pub mod types;
