// Copyright (c) 2026 Lottery Harness Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Lottery harness: a timed, stake-to-enter lottery with oracle-driven winner
//! selection, run against an in-process development chain.
//!
//! This repository provides:
//! - The round state machine (stake, upkeep gate, randomness callback, payout)
//! - VRF coordinator and price feed mocks
//! - A simulated chain with automine, time travel, snapshots and atomic transactions
//! - Tagged deploy scripts with fixtures and a persistent deployment store
//! - Keeper, oracle service and interval miner tasks
//! - Monitoring via Prometheus metrics and structured logging

/// Core primitives (types, contracts, chain, automation, config, state).
pub mod core;
/// Deploy scripts, fixtures and verification.
pub mod deploy;
/// Observability (metrics, HTTP exposition, logging setup).
pub mod monitoring;
