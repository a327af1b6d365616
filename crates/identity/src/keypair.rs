// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use k256::ecdsa::{signature::DigestSigner, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use meshsdk_core::{EthAddress, NodeAddress};
use sha3::{Digest, Keccak256};

use crate::error::{IdentityError, Result};

/// Node addresses carry this prefix followed by the URL-safe base64 encoding
/// of the compressed secp256k1 public key.
pub const NODE_ADDRESS_PREFIX: &str = "0xai_";

/// A secp256k1 key pair plus the derived node/EVM addresses.
pub struct KeyPair {
    secret: SecretKey,
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    address: NodeAddress,
    eth_address: EthAddress,
}

impl KeyPair {
    #[must_use]
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut k256::elliptic_curve::rand_core::OsRng);
        Self::from_secret(secret)
    }

    /// Rebuilds a key pair from raw scalar bytes (e.g. loaded from the
    /// on-disk key file).
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a valid secp256k1 scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| IdentityError::Sign(format!("invalid key material: {e}")))?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let signing_key = SigningKey::from(&secret);
        let verifying_key = *signing_key.verifying_key();
        let address = node_address_from_public(&verifying_key.into());
        let eth_address = eth_address_from_public(&verifying_key.into());
        Self { secret, signing_key, verifying_key, address, eth_address }
    }

    #[must_use]
    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    #[must_use]
    pub fn eth_address(&self) -> &EthAddress {
        &self.eth_address
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.verifying_key.into()
    }

    #[must_use]
    pub fn secret_scalar(&self) -> SecretKey {
        self.secret.clone()
    }

    /// Signs a message digest (Keccak256) with this key, as
    /// `use_digest=True` selects in the original protocol.
    #[must_use]
    pub fn sign_digest(&self, message: &[u8]) -> Signature {
        let digest = Keccak256::new_with_prefix(message);
        self.signing_key.sign_digest(digest)
    }
}

#[must_use]
pub fn node_address_from_public(pk: &PublicKey) -> NodeAddress {
    let compressed = pk.to_encoded_point(true);
    let b64 = base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        compressed.as_bytes(),
    );
    NodeAddress::new(format!("{NODE_ADDRESS_PREFIX}{b64}"))
}

#[must_use]
pub fn eth_address_from_public(pk: &PublicKey) -> EthAddress {
    let uncompressed = pk.to_encoded_point(false);
    let bytes = uncompressed.as_bytes();
    // Drop the leading 0x04 tag before hashing, per EVM address derivation.
    let hash = Keccak256::digest(&bytes[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    EthAddress::from_bytes(out)
}

/// Parses a node address back into its public key, used to derive a shared
/// secret with a remote peer for decryption/verification.
///
/// # Errors
///
/// Returns [`IdentityError::UnknownAddress`] if `addr` is not
/// `NODE_ADDRESS_PREFIX`-prefixed valid base64 of a compressed secp256k1 point.
pub fn public_key_from_address(addr: &NodeAddress) -> Result<PublicKey> {
    let raw = addr
        .as_str()
        .strip_prefix(NODE_ADDRESS_PREFIX)
        .ok_or_else(|| IdentityError::UnknownAddress(addr.as_str().to_string()))?;
    let bytes = base64::Engine::decode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, raw)
        .map_err(|_| IdentityError::UnknownAddress(addr.as_str().to_string()))?;
    PublicKey::from_sec1_bytes(&bytes).map_err(|_| IdentityError::UnknownAddress(addr.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_has_expected_prefix() {
        let kp = KeyPair::generate();
        assert!(kp.address().as_str().starts_with(NODE_ADDRESS_PREFIX));
    }

    #[test]
    fn address_round_trips_to_public_key() {
        let kp = KeyPair::generate();
        let recovered = public_key_from_address(kp.address()).expect("valid address");
        assert_eq!(recovered, kp.public_key());
    }

    #[test]
    fn eth_address_is_stable_for_same_key() {
        let kp = KeyPair::generate();
        let a = eth_address_from_public(&kp.public_key());
        let b = eth_address_from_public(&kp.public_key());
        assert_eq!(a, b);
    }
}
