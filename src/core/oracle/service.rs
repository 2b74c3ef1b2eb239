// Copyright (c) 2026 Lottery Harness Authors
// Licensed under the Apache License, Version 2.0

//! Off-chain side of the randomness oracle.
//!
//! Receives request notices from the devnet, waits until the request block has
//! the requested number of confirmations and answers it through the
//! coordinator. Each notice is handled on its own task, so a request waiting
//! for confirmations never delays another round's answer.

#![forbid(unsafe_code)]

use crate::core::oracle::coordinator::Delivery;
use crate::core::runtime::devnet::{DevnetError, RequestNotice, SharedDevnet};
use crate::core::types::Address;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outcome of handling one notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fulfillment {
    /// Answered; `success` reports whether the consumer callback went through.
    Delivered { success: bool },
    /// The coordinator no longer knows the request (answered or never issued).
    Dropped,
}

/// Oracle service settings.
#[derive(Clone, Copy, Debug)]
pub struct OracleConfig {
    /// How often the chain height is polled while waiting for confirmations.
    pub poll_interval: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
        }
    }
}

/// Answers randomness requests from `account`.
#[derive(Clone)]
pub struct OracleService {
    devnet: SharedDevnet,
    account: Address,
    cfg: OracleConfig,
}

impl OracleService {
    /// Service answering from `account` (any funded account works on the mock).
    pub fn new(devnet: SharedDevnet, account: Address, cfg: OracleConfig) -> Self {
        Self {
            devnet,
            account,
            cfg,
        }
    }

    /// Block height at which `notice` may be answered.
    pub fn ready_at(notice: &RequestNotice) -> u64 {
        notice
            .block_number
            .saturating_add(u64::from(notice.min_confirmations))
    }

    /// Wait for confirmations, then answer `notice`.
    pub async fn handle(&self, notice: RequestNotice) -> Result<Fulfillment, DevnetError> {
        let ready_at = Self::ready_at(&notice);
        loop {
            let mut devnet = self.devnet.lock().await;
            if devnet.head().number >= ready_at {
                let delivery = devnet.coordinator(&notice.coordinator)?.lookup(notice.request_id);
                if let Delivery::Unknown(id) = delivery {
                    warn!(request_id = id, "nonexistent request; dropping notice");
                    return Ok(Fulfillment::Dropped);
                }
                let receipt = devnet.fulfill_random_words(
                    notice.coordinator,
                    self.account,
                    notice.request_id,
                    notice.consumer,
                )?;
                info!(
                    request_id = notice.request_id,
                    consumer = %notice.consumer,
                    block = receipt.block.number,
                    success = receipt.output,
                    "random words delivered"
                );
                return Ok(Fulfillment::Delivered {
                    success: receipt.output,
                });
            }
            debug!(
                request_id = notice.request_id,
                head = devnet.head().number,
                ready_at,
                "waiting for confirmations"
            );
            drop(devnet);
            tokio::time::sleep(self.cfg.poll_interval).await;
        }
    }
}

/// Spawn the service loop. It ends when the notice channel closes.
pub fn spawn_oracle_service(
    service: OracleService,
    mut notices: mpsc::UnboundedReceiver<RequestNotice>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            let svc = service.clone();
            tokio::spawn(async move {
                let request_id = notice.request_id;
                if let Err(e) = svc.handle(notice).await {
                    warn!(request_id, error = %e, "fulfilment failed");
                }
            });
        }
        debug!("oracle notice channel closed");
    })
}
