// Copyright (c) 2025 VeilChain Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stateless, side-effect-free cryptographic primitives: AEAD seal/open, a
//! keyed MAC used only for address derivation, and secure random bytes.
//!
//! The per-node symmetric key MUST be a fresh uniform random sample, never
//! derived from the keyword, the document, or any prior key -- this is the
//! source of forward privacy (see crate docs).

use aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key as AesKey, Nonce as AesNonce};
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;

use crate::error::CryptoError;

/// Length of an AES-256-GCM key, in bytes.
pub const KEY_LEN: usize = 32;
/// Length of an AES-256-GCM nonce, in bytes.
pub const NONCE_LEN: usize = 12;
/// Length of an HMAC-SHA256 output, in bytes.
pub const MAC_LEN: usize = 32;

/// Fixed domain separator for address derivation. The MAC is never reused
/// for authentication elsewhere; AEAD carries that role.
pub const ADDRESS_LABEL: &[u8] = b"address";

type HmacSha256 = Hmac<Sha256>;

/// Returns `n` bytes from the OS cryptographically strong RNG. Fails only
/// if the entropy source itself is unavailable.
pub fn random_bytes(n: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; n];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(buf)
}

/// Fills a fixed-size array with random bytes. Convenience wrapper over
/// [`random_bytes`] for the 12- and 32-byte cases used throughout the crate.
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(buf)
}

/// AES-256-GCM seal. `aad` is authenticated but not encrypted. The returned
/// ciphertext includes the 16-byte authentication tag appended.
pub fn aead_seal(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key));
    cipher
        .encrypt(AesNonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::SealFailed(e.to_string()))
}

/// AES-256-GCM verify-and-decrypt. On authentication failure this returns
/// [`CryptoError::AuthFailed`] and the caller MUST NOT treat any partial
/// output as plaintext -- none is produced on this path.
pub fn aead_open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(AesNonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map_err(|_| CryptoError::AuthFailed)
}

/// HMAC-SHA256(key, label). Used only to derive a node's server-side address
/// from its freshly-generated key; never used as an authentication tag.
pub fn mac(key: &[u8; KEY_LEN], label: &[u8]) -> [u8; MAC_LEN] {
    let mut hmac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    hmac.update(label);
    hmac.finalize().into_bytes().into()
}

/// Derives the server-side address for a freshly generated node key.
pub fn derive_address(node_key: &[u8; KEY_LEN]) -> [u8; MAC_LEN] {
    mac(node_key, ADDRESS_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let key = random_array::<KEY_LEN>().unwrap();
        let nonce = random_array::<NONCE_LEN>().unwrap();
        let aad = b"some-address";
        let plaintext = b"node payload";

        let ct = aead_seal(&key, &nonce, plaintext, aad).unwrap();
        assert_ne!(ct, plaintext);

        let pt = aead_open(&key, &nonce, &ct, aad).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn open_fails_on_wrong_aad() {
        let key = random_array::<KEY_LEN>().unwrap();
        let nonce = random_array::<NONCE_LEN>().unwrap();
        let ct = aead_seal(&key, &nonce, b"payload", b"aad-a").unwrap();
        assert!(matches!(
            aead_open(&key, &nonce, &ct, b"aad-b"),
            Err(CryptoError::AuthFailed)
        ));
    }

    #[test]
    fn open_fails_on_tampered_ciphertext() {
        let key = random_array::<KEY_LEN>().unwrap();
        let nonce = random_array::<NONCE_LEN>().unwrap();
        let mut ct = aead_seal(&key, &nonce, b"payload", b"aad").unwrap();
        ct[0] ^= 0xff;
        assert!(matches!(
            aead_open(&key, &nonce, &ct, b"aad"),
            Err(CryptoError::AuthFailed)
        ));
    }

    #[test]
    fn mac_is_deterministic_and_key_dependent() {
        let key_a = random_array::<KEY_LEN>().unwrap();
        let key_b = random_array::<KEY_LEN>().unwrap();

        assert_eq!(mac(&key_a, ADDRESS_LABEL), mac(&key_a, ADDRESS_LABEL));
        assert_ne!(mac(&key_a, ADDRESS_LABEL), mac(&key_b, ADDRESS_LABEL));
    }

    #[test]
    fn random_bytes_are_not_all_zero() {
        // Not a statistical test -- just catches a broken/stubbed RNG outright.
        let a = random_bytes(32).unwrap();
        let b = random_bytes(32).unwrap();
        assert_ne!(a, vec![0u8; 32]);
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_keys_yield_distinct_addresses() {
        let k1 = random_array::<KEY_LEN>().unwrap();
        let k2 = random_array::<KEY_LEN>().unwrap();
        assert_ne!(derive_address(&k1), derive_address(&k2));
    }
}
