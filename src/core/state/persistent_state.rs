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

//! Deployment records persisted in sled, keyed by `<network>/<contract name>`.
//! Values are canonical bincode.

use crate::core::types::{decode_canonical_limited, encode_canonical, Address};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use std::path::Path;
use thiserror::Error;

/// Upper bound for one encoded record.
pub const MAX_RECORD_BYTES: usize = 64 * 1024;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db open")]
    DbOpen,
    #[error("db io")]
    DbIo,
    #[error("corrupt record {0}")]
    Corrupt(String),
    #[error("encode record")]
    Encode,
}

/// One deployed contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Contract name.
    pub name: String,
    /// Deployed address.
    pub address: Address,
    /// Constructor arguments, rendered as strings.
    pub args: Vec<String>,
    /// Deployer.
    pub deployer: Address,
    /// Block that included the deployment.
    pub block_number: u64,
}

enum StoreOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Del { key: Vec<u8> },
}

fn key(network: &str, name: &str) -> Vec<u8> {
    format!("{network}/{name}").into_bytes()
}

fn prefix(network: &str) -> Vec<u8> {
    format!("{network}/").into_bytes()
}

/// Deployment store.
#[derive(Clone)]
pub struct DeploymentStore {
    db: sled::Db,
}

impl DeploymentStore {
    /// Open (or create) the store in directory `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|_| StoreError::DbOpen)?;
        Ok(Self { db })
    }

    /// Insert or replace the record of `record.name` on `network`.
    pub fn record(&self, network: &str, record: &DeploymentRecord) -> Result<(), StoreError> {
        let value = encode_canonical(record).map_err(|_| StoreError::Encode)?;
        self.commit(vec![StoreOp::Put {
            key: key(network, &record.name),
            value,
        }])
    }

    /// Record of `name` on `network`.
    pub fn get(&self, network: &str, name: &str) -> Result<Option<DeploymentRecord>, StoreError> {
        let k = key(network, name);
        let Some(v) = self.db.get(&k).map_err(|_| StoreError::DbIo)? else {
            return Ok(None);
        };
        decode_canonical_limited(&v, MAX_RECORD_BYTES)
            .map(Some)
            .map_err(|_| StoreError::Corrupt(String::from_utf8_lossy(&k).into_owned()))
    }

    /// All records of `network`, ordered by contract name.
    pub fn list(&self, network: &str) -> Result<Vec<DeploymentRecord>, StoreError> {
        let mut out = Vec::new();
        for item in self.db.scan_prefix(prefix(network)) {
            let (k, v) = item.map_err(|_| StoreError::DbIo)?;
            let rec = decode_canonical_limited(&v, MAX_RECORD_BYTES)
                .map_err(|_| StoreError::Corrupt(String::from_utf8_lossy(&k).into_owned()))?;
            out.push(rec);
        }
        Ok(out)
    }

    /// Drop every record of `network` in one transaction. Returns how many were removed.
    pub fn reset(&self, network: &str) -> Result<usize, StoreError> {
        let mut ops = Vec::new();
        for item in self.db.scan_prefix(prefix(network)) {
            let (k, _) = item.map_err(|_| StoreError::DbIo)?;
            ops.push(StoreOp::Del { key: k.to_vec() });
        }
        let n = ops.len();
        self.commit(ops)?;
        Ok(n)
    }

    /// Flush to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush().map(|_| ()).map_err(|_| StoreError::DbIo)
    }

    fn commit(&self, ops: Vec<StoreOp>) -> Result<(), StoreError> {
        let res: TransactionResult<(), StoreError> = self.db.transaction(|t| {
            for op in ops.iter() {
                match op {
                    StoreOp::Put { key, value } => {
                        t.insert(key.as_slice(), value.as_slice())
                            .map_err(|_| ConflictableTransactionError::Abort(StoreError::DbIo))?;
                    }
                    StoreOp::Del { key } => {
                        t.remove(key.as_slice())
                            .map_err(|_| ConflictableTransactionError::Abort(StoreError::DbIo))?;
                    }
                }
            }
            Ok(())
        });

        match res {
            Ok(()) => Ok(()),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(_)) => Err(StoreError::DbIo),
        }
    }
}
