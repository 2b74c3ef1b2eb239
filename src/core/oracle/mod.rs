#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Randomness oracle seam, the VRF coordinator mock, the price feed mock and the
//! async fulfilment service.

pub mod aggregator;
pub mod coordinator;
pub mod service;

use crate::core::runtime::chain::{CallContext, Log};
use crate::core::types::{Address, RequestId, SubscriptionId, Wei, H256};
use thiserror::Error;

/// Oracle (coordinator) errors. Display strings are the coordinator's revert reasons.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("InvalidSubscription({0})")]
    InvalidSubscription(SubscriptionId),
    #[error("InvalidConsumer({sub_id}, {consumer})")]
    InvalidConsumer {
        sub_id: SubscriptionId,
        consumer: Address,
    },
    #[error("MustBeSubOwner({owner})")]
    MustBeSubOwner { owner: Address },
    #[error("TooManyConsumers")]
    TooManyConsumers,
    #[error("nonexistent request")]
    NonexistentRequest(RequestId),
    #[error("InsufficientBalance: balance {balance}, payment {payment}")]
    InsufficientBalance { balance: Wei, payment: Wei },
    #[error("InvalidRandomWords: expected {expected}, got {got}")]
    InvalidRandomWords { expected: u32, got: usize },
}

/// Parameters of a randomness request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomnessRequest {
    /// Oracle key material selecting the proving key (gas lane).
    pub key_hash: H256,
    /// Subscription paying for the request.
    pub sub_id: SubscriptionId,
    /// Blocks the oracle waits before answering.
    pub min_confirmations: u16,
    /// Gas budget for the consumer callback.
    pub callback_gas_limit: u32,
    /// Number of random words requested.
    pub num_words: u32,
}

/// Asynchronous randomness source: accepts a request now, answers later by request id.
pub trait RandomnessOracle {
    /// Address the answer will come from.
    fn address(&self) -> Address;

    /// Register a request from `ctx.sender` and return its identifier.
    fn request_random_words(
        &mut self,
        ctx: &CallContext,
        request: RandomnessRequest,
        logs: &mut Vec<Log>,
    ) -> Result<RequestId, OracleError>;
}
