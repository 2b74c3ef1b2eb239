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

//! Deterministic core types: addresses, 256-bit words, amounts and canonical encoding.

use bincode::Options;
use ring::digest::{digest, SHA256};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Amount in wei.
pub type Wei = u128;

/// Randomness request identifier assigned by the coordinator.
pub type RequestId = u64;

/// Coordinator subscription identifier.
pub type SubscriptionId = u64;

/// One ether in wei.
pub const WEI_PER_ETHER: Wei = 1_000_000_000_000_000_000;

/// Whole ether amount in wei (saturating).
pub fn ether(n: u128) -> Wei {
    n.saturating_mul(WEI_PER_ETHER)
}

/// Canonical serialization error.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization")]
    Serialize,
    #[error("deserialization")]
    Deserialize,
    #[error("size limit exceeded")]
    TooLarge,
}

/// Parse errors for hex words, addresses and decimal amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid hex")]
    InvalidHex,
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("invalid amount")]
    InvalidAmount,
}

/// Canonical bincode options (deterministic).
fn bincode_opts() -> impl Options {
    // Fixint encoding provides a stable integer representation.
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode with deterministic rules. Requires deterministic container ordering
/// (use BTreeMap/BTreeSet).
pub fn encode_canonical<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    bincode_opts()
        .serialize(v)
        .map_err(|_| CodecError::Serialize)
}

/// Decode with a hard size cap.
pub fn decode_canonical_limited<T: DeserializeOwned>(
    bytes: &[u8],
    max: usize,
) -> Result<T, CodecError> {
    if bytes.len() > max {
        return Err(CodecError::TooLarge);
    }
    bincode_opts()
        .with_limit(max as u64)
        .deserialize(bytes)
        .map_err(|_| CodecError::Deserialize)
}

/// SHA-256 over the concatenation of `parts`.
pub fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for p in parts {
        buf.extend_from_slice(p);
    }
    let d = digest(&SHA256, &buf);
    let mut out = [0u8; 32];
    out.copy_from_slice(d.as_ref());
    out
}

fn decode_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(s).map_err(|_| ParseError::InvalidHex)?;
    if bytes.len() != N {
        return Err(ParseError::InvalidLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// 256-bit word (32 bytes, big-endian when read as an integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct H256([u8; 32]);

impl H256 {
    /// All-zero word.
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Construct from raw bytes.
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    /// Return bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Word holding `v` in its low-order bytes.
    pub fn from_u64(v: u64) -> Self {
        let mut b = [0u8; 32];
        b[24..].copy_from_slice(&v.to_be_bytes());
        Self(b)
    }

    /// Exact `self mod m` treating the word as an unsigned big-endian integer.
    ///
    /// Returns `None` when `m == 0`.
    pub fn mod_usize(&self, m: usize) -> Option<usize> {
        if m == 0 {
            return None;
        }
        let m = m as u128;
        let mut r: u128 = 0;
        for b in self.0.iter() {
            // r < m <= usize::MAX, so r * 256 + 255 fits in u128.
            r = (r * 256 + *b as u128) % m;
        }
        Some(r as usize)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for H256 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex_fixed::<32>(s).map(Self)
    }
}

impl TryFrom<String> for H256 {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<H256> for String {
    fn from(h: H256) -> Self {
        h.to_string()
    }
}

/// 20-byte account or contract address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Construct from raw bytes.
    pub fn from_bytes(b: [u8; 20]) -> Self {
        Self(b)
    }

    /// Return bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Deterministic development account `index`, stable across runs.
    pub fn dev_account(index: u32) -> Self {
        let h = sha256(&[b"lottery-harness/dev-account/v1", &index.to_be_bytes()]);
        Self::from_hash_tail(&h)
    }

    /// Address of the contract created by `deployer` at `nonce`.
    pub fn contract(deployer: &Address, nonce: u64) -> Self {
        let h = sha256(&[b"lottery-harness/create/v1", &deployer.0, &nonce.to_be_bytes()]);
        Self::from_hash_tail(&h)
    }

    fn from_hash_tail(h: &[u8; 32]) -> Self {
        let mut out = [0u8; 20];
        out.copy_from_slice(&h[12..]);
        Self(out)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex_fixed::<20>(s).map(Self)
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.to_string()
    }
}

/// Parse a decimal ether amount such as `"1.0"` or `"0.25"` into wei.
pub fn parse_ether(s: &str) -> Result<Wei, ParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseError::InvalidAmount);
    }
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if frac.len() > 18 || (whole.is_empty() && frac.is_empty()) {
        return Err(ParseError::InvalidAmount);
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::InvalidAmount);
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseError::InvalidAmount)?
    };
    let mut frac_wei: u128 = 0;
    if !frac.is_empty() {
        let padded = format!("{frac:0<18}");
        frac_wei = padded.parse().map_err(|_| ParseError::InvalidAmount)?;
    }
    whole
        .checked_mul(WEI_PER_ETHER)
        .and_then(|w| w.checked_add(frac_wei))
        .ok_or(ParseError::InvalidAmount)
}
