// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node's public-key-derived identifier on the mesh (prefixed string form).
///
/// Opaque on purpose: the SDK never parses the internal structure of an
/// address, it only compares and hashes them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddress(String);

impl NodeAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NodeAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An Ethereum-compatible 20-byte address derived from a node's public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EthAddress([u8; 20]);

#[derive(Debug, thiserror::Error)]
pub enum EthAddressParseError {
    #[error("expected a 0x-prefixed 40-hex-digit address, got {0:?}")]
    InvalidFormat(String),
}

impl EthAddress {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parses a `0x`-prefixed, 40-hex-digit checksummed or lowercase address.
    ///
    /// # Errors
    ///
    /// Returns [`EthAddressParseError::InvalidFormat`] if `s` is not exactly
    /// `0x` followed by 40 hex digits.
    pub fn parse(s: &str) -> Result<Self, EthAddressParseError> {
        let hex_part = s.strip_prefix("0x").ok_or_else(|| EthAddressParseError::InvalidFormat(s.to_string()))?;
        if hex_part.len() != 40 {
            return Err(EthAddressParseError::InvalidFormat(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|_| EthAddressParseError::InvalidFormat(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for EthAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
