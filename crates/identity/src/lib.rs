// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The key-pair façade the Session signs, encrypts, and decrypts through.
//!
//! Out of scope per the system this crate belongs to: wallet transport,
//! key-file persistence format. This crate owns only the cryptographic
//! primitives, consumed through the [`Identity`] trait.

mod cipher;
mod error;
mod keypair;

pub use error::{IdentityError, Result};
pub use k256::PublicKey;
pub use keypair::{
    eth_address_from_public, node_address_from_public, public_key_from_address, KeyPair,
    NODE_ADDRESS_PREFIX,
};

use meshsdk_core::{EthAddress, NodeAddress};

/// Everything the Session needs from a key pair: addressing, signing, and
/// ECIES-style encryption/decryption.
pub trait Identity: Send + Sync {
    /// This identity's mesh address.
    fn address(&self) -> &NodeAddress;

    /// This identity's derived EVM address, if EVM signing is enabled.
    fn eth_address(&self) -> &EthAddress;

    /// Signs `message`, returning a signature in the wire hex format used by
    /// the `EE_SIGN` field.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Sign`] if the underlying signing operation
    /// fails.
    fn sign(&self, message: &[u8]) -> Result<String>;

    /// Encrypts `plaintext` for one or more recipients, resolving addresses
    /// to public keys via `resolve`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NoRecipients`] if `recipients` is empty, or
    /// [`IdentityError::UnknownAddress`] if any recipient cannot be resolved.
    fn encrypt(&self, plaintext: &[u8], recipients: &[NodeAddress]) -> Result<Vec<u8>>;

    /// Decrypts `ciphertext` sent by `sender`, returning the plaintext if
    /// this identity's address appears in the embedded recipient list.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Decrypt`] if this identity is not a listed
    /// recipient, the sender's address does not resolve, or the AEAD step
    /// fails.
    fn decrypt(&self, ciphertext: &[u8], sender: &NodeAddress) -> Result<Vec<u8>>;

    /// True if `self.address()` is present in `addresses`.
    fn contains_self(&self, addresses: &[NodeAddress]) -> bool {
        addresses.iter().any(|a| a == self.address())
    }

    /// Recovers the public key embedded in a node address, or `None` if the
    /// address isn't a valid encoding of one.
    fn pk_from_address(&self, addr: &NodeAddress) -> Option<PublicKey>;
}

/// The concrete secp256k1-backed [`Identity`]: ECDSA signing, Keccak256 EVM
/// address derivation, ECDH-derived ECIES encryption.
pub struct Secp256k1Identity {
    keys: KeyPair,
}

impl Secp256k1Identity {
    #[must_use]
    pub fn generate() -> Self {
        Self { keys: KeyPair::generate() }
    }

    /// Restores an identity from previously persisted scalar bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Sign`] if `bytes` is not a valid secp256k1
    /// scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self { keys: KeyPair::from_bytes(bytes)? })
    }
}

impl Identity for Secp256k1Identity {
    fn address(&self) -> &NodeAddress {
        self.keys.address()
    }

    fn eth_address(&self) -> &EthAddress {
        self.keys.eth_address()
    }

    fn sign(&self, message: &[u8]) -> Result<String> {
        let signature = self.keys.sign_digest(message);
        Ok(hex::encode(signature.to_bytes()))
    }

    fn encrypt(&self, plaintext: &[u8], recipients: &[NodeAddress]) -> Result<Vec<u8>> {
        let mut resolved = Vec::with_capacity(recipients.len());
        for addr in recipients {
            let pk = public_key_from_address(addr)?;
            resolved.push((addr.clone(), pk));
        }
        cipher::encrypt_for_recipients(&self.keys.secret_scalar(), plaintext, &resolved)
    }

    fn decrypt(&self, ciphertext: &[u8], sender: &NodeAddress) -> Result<Vec<u8>> {
        let sender_pk = public_key_from_address(sender)?;
        cipher::decrypt_as_recipient(self.address(), &self.keys.secret_scalar(), &sender_pk, ciphertext)
    }

    fn pk_from_address(&self, addr: &NodeAddress) -> Option<PublicKey> {
        public_key_from_address(addr).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_self_matches_own_address() {
        let identity = Secp256k1Identity::generate();
        let addresses = vec![identity.address().clone(), NodeAddress::new("someone-else")];
        assert!(identity.contains_self(&addresses));
    }

    #[test]
    fn contains_self_false_when_absent() {
        let identity = Secp256k1Identity::generate();
        assert!(!identity.contains_self(&[NodeAddress::new("someone-else")]));
    }

    #[test]
    fn pk_from_address_recovers_the_same_key_used_to_derive_the_address() {
        let identity = Secp256k1Identity::generate();
        let recovered = identity.pk_from_address(identity.address()).expect("address is well-formed");
        assert_eq!(recovered, identity.keys.public_key());
    }

    #[test]
    fn pk_from_address_is_none_for_a_malformed_address() {
        let identity = Secp256k1Identity::generate();
        assert!(identity.pk_from_address(&NodeAddress::new("not-a-valid-address")).is_none());
    }

    #[test]
    fn encrypt_decrypt_round_trip_between_two_identities() {
        let alice = Secp256k1Identity::generate();
        let bob = Secp256k1Identity::generate();

        let ciphertext = alice.encrypt(b"hello", &[bob.address().clone()]).expect("encrypts");
        let plaintext = bob.decrypt(&ciphertext, alice.address()).expect("decrypts");
        assert_eq!(plaintext, b"hello");
    }
}
