// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! ECIES-style multi-recipient encryption.
//!
//! One content-encryption key (CEK) encrypts the body once; a per-recipient
//! ECDH shared secret wraps a copy of the CEK for each recipient. Decryption
//! scans the embedded recipient list for the caller's own address, so a
//! single-recipient envelope is just the one-entry degenerate case of the
//! same routine.

use aes_siv::aead::{Aead, KeyInit};
use aes_siv::{Aes256SivAead, Nonce};
use hkdf::Hkdf;
use k256::{PublicKey, SecretKey};
use meshsdk_core::NodeAddress;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{IdentityError, Result};

const CEK_LEN: usize = 64;
const NONCE_LEN: usize = 16;

#[derive(Serialize, Deserialize)]
struct WrappedKey {
    address: String,
    nonce: String,
    wrapped_cek: String,
}

#[derive(Serialize, Deserialize)]
struct EciesBlob {
    recipients: Vec<WrappedKey>,
    body_nonce: String,
    ciphertext: String,
}

fn ecdh_shared_secret(local: &SecretKey, remote: &PublicKey) -> Vec<u8> {
    let shared = k256::ecdh::diffie_hellman(local.to_nonzero_scalar(), remote.as_affine());
    shared.raw_secret_bytes().to_vec()
}

#[allow(clippy::expect_used)]
fn derive_key(shared_secret: &[u8]) -> [u8; CEK_LEN] {
    let hk = Hkdf::<Sha256>::new(None, shared_secret);
    let mut okm = [0u8; CEK_LEN];
    hk.expand(b"meshsdk-ecies-v1", &mut okm)
        .expect("64-byte output is within HKDF-SHA256's expansion limit");
    okm
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::rng().fill_bytes(&mut buf);
    buf
}

/// Encrypts `plaintext` once and wraps the content key for every recipient.
///
/// # Errors
///
/// Returns [`IdentityError::NoRecipients`] if `recipients` is empty, or a
/// [`IdentityError::Sign`] wrapping any underlying AEAD failure.
pub fn encrypt_for_recipients(
    sender_secret: &SecretKey,
    plaintext: &[u8],
    recipients: &[(NodeAddress, PublicKey)],
) -> Result<Vec<u8>> {
    if recipients.is_empty() {
        return Err(IdentityError::NoRecipients);
    }

    let mut cek = random_bytes::<CEK_LEN>();
    let body_cipher = Aes256SivAead::new_from_slice(&cek)
        .map_err(|e| IdentityError::Sign(format!("bad content key: {e}")))?;
    let body_nonce_bytes = random_bytes::<NONCE_LEN>();
    let ciphertext = body_cipher
        .encrypt(Nonce::from_slice(&body_nonce_bytes), plaintext)
        .map_err(|e| IdentityError::Sign(format!("body encryption failed: {e}")))?;

    let mut recipients_out = Vec::with_capacity(recipients.len());
    for (address, recipient_pk) in recipients {
        let shared = ecdh_shared_secret(sender_secret, recipient_pk);
        let kek = derive_key(&shared);
        let recipient_cipher = Aes256SivAead::new_from_slice(&kek)
            .map_err(|e| IdentityError::Sign(format!("bad wrap key: {e}")))?;
        let key_nonce_bytes = random_bytes::<NONCE_LEN>();
        let wrapped_cek = recipient_cipher
            .encrypt(Nonce::from_slice(&key_nonce_bytes), cek.as_slice())
            .map_err(|e| IdentityError::Sign(format!("key wrap failed: {e}")))?;
        recipients_out.push(WrappedKey {
            address: address.as_str().to_string(),
            nonce: hex::encode(key_nonce_bytes),
            wrapped_cek: hex::encode(wrapped_cek),
        });
    }
    cek.zeroize();

    let blob = EciesBlob {
        recipients: recipients_out,
        body_nonce: hex::encode(body_nonce_bytes),
        ciphertext: hex::encode(ciphertext),
    };
    serde_json::to_vec(&blob).map_err(|e| IdentityError::Sign(e.to_string()))
}

/// Locates `self_address`'s wrapped key inside `blob_bytes`, unwraps the
/// content key using the ECDH secret shared with `sender_pk`, and decrypts
/// the body.
///
/// # Errors
///
/// Returns [`IdentityError::Decrypt`] if `self_address` has no wrapped entry,
/// the blob is malformed, or any AEAD step fails (wrong sender, tampering).
pub fn decrypt_as_recipient(
    self_address: &NodeAddress,
    self_secret: &SecretKey,
    sender_pk: &PublicKey,
    blob_bytes: &[u8],
) -> Result<Vec<u8>> {
    let blob: EciesBlob =
        serde_json::from_slice(blob_bytes).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
    let entry = blob
        .recipients
        .iter()
        .find(|w| w.address == self_address.as_str())
        .ok_or_else(|| IdentityError::Decrypt("no wrapped key for self in envelope".to_string()))?;

    let shared = ecdh_shared_secret(self_secret, sender_pk);
    let kek = derive_key(&shared);
    let recipient_cipher =
        Aes256SivAead::new_from_slice(&kek).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
    let key_nonce = hex::decode(&entry.nonce).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
    let wrapped_cek =
        hex::decode(&entry.wrapped_cek).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
    let cek = recipient_cipher
        .decrypt(Nonce::from_slice(&key_nonce), wrapped_cek.as_slice())
        .map_err(|e| IdentityError::Decrypt(format!("key unwrap failed: {e}")))?;

    let body_cipher =
        Aes256SivAead::new_from_slice(&cek).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
    let body_nonce =
        hex::decode(&blob.body_nonce).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
    let ciphertext =
        hex::decode(&blob.ciphertext).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
    body_cipher
        .decrypt(Nonce::from_slice(&body_nonce), ciphertext.as_slice())
        .map_err(|e| IdentityError::Decrypt(format!("body decryption failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> (SecretKey, PublicKey) {
        let sk = SecretKey::random(&mut k256::elliptic_curve::rand_core::OsRng);
        let pk = sk.public_key();
        (sk, pk)
    }

    #[test]
    fn single_recipient_round_trips() {
        let (sender_sk, sender_pk) = keypair();
        let (recipient_sk, recipient_pk) = keypair();
        let recipient_addr = NodeAddress::new("r1");

        let blob = encrypt_for_recipients(
            &sender_sk,
            b"hello",
            &[(recipient_addr.clone(), recipient_pk)],
        )
        .expect("encrypts");

        let plaintext =
            decrypt_as_recipient(&recipient_addr, &recipient_sk, &sender_pk, &blob).expect("decrypts");
        assert_eq!(plaintext, b"hello");
    }

    #[test]
    fn multi_recipient_each_decrypts_independently() {
        let (sender_sk, sender_pk) = keypair();
        let (r1_sk, r1_pk) = keypair();
        let (r2_sk, r2_pk) = keypair();
        let (r3_sk, r3_pk) = keypair();
        let (r4_sk, _r4_pk) = keypair();

        let a1 = NodeAddress::new("r1");
        let a2 = NodeAddress::new("r2");
        let a3 = NodeAddress::new("r3");
        let a4 = NodeAddress::new("r4");

        let blob = encrypt_for_recipients(
            &sender_sk,
            b"hello",
            &[(a1.clone(), r1_pk), (a2.clone(), r2_pk), (a3.clone(), r3_pk)],
        )
        .expect("encrypts");

        for (addr, sk) in [(&a1, &r1_sk), (&a2, &r2_sk), (&a3, &r3_sk)] {
            let plaintext =
                decrypt_as_recipient(addr, sk, &sender_pk, &blob).expect("decrypts for recipient");
            assert_eq!(plaintext, b"hello");
        }

        assert!(decrypt_as_recipient(&a4, &r4_sk, &sender_pk, &blob).is_err());
    }

    #[test]
    fn empty_recipients_is_rejected() {
        let (sender_sk, _) = keypair();
        assert!(matches!(
            encrypt_for_recipients(&sender_sk, b"hello", &[]),
            Err(IdentityError::NoRecipients)
        ));
    }
}
