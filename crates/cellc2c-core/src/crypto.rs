//! Thin contracts over the cryptographic primitives the channel relies on:
//! AES-128-CBC, SHA-256, HMAC-SHA-256, and a CSPRNG.
//!
//! These are synchronous, stateless, reentrant operations on contiguous byte
//! ranges. Callers are expected to pass correctly sized buffers; a length
//! mismatch is a programmer error and panics rather than returning a
//! `Result`, matching the contract in spec §4.1.

use aes::Aes128;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use rand::RngCore;
use ring::hmac;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Encrypt `plaintext` (already padded to a 16-byte boundary) with
/// AES-128-CBC, returning a freshly allocated ciphertext of the same length.
///
/// # Panics
///
/// Panics if `plaintext.len()` is not a multiple of 16.
pub fn aes128_cbc_encrypt(key: &[u8; 16], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    assert!(
        plaintext.len().is_multiple_of(16),
        "aes128_cbc_encrypt requires block-aligned input, got {} bytes",
        plaintext.len()
    );
    let mut buf = plaintext.to_vec();
    aes128_cbc_encrypt_in_place(key, iv, &mut buf);
    buf
}

/// Encrypt `buf` (already padded to a 16-byte boundary) with AES-128-CBC in
/// place.
///
/// # Panics
///
/// Panics if `buf.len()` is not a multiple of 16.
pub fn aes128_cbc_encrypt_in_place(key: &[u8; 16], iv: &[u8; 16], buf: &mut [u8]) {
    assert!(
        buf.len().is_multiple_of(16),
        "aes128_cbc_encrypt_in_place requires block-aligned input, got {} bytes",
        buf.len()
    );
    let encryptor = Aes128CbcEnc::new(key.into(), iv.into());
    encryptor
        .encrypt_padded_mut::<NoPadding>(buf, buf.len())
        .expect("block-aligned buffer cannot overflow NoPadding encryption");
}

/// Decrypt `ciphertext` with AES-128-CBC, returning a freshly allocated
/// plaintext (still padded; callers strip padding with [`crate::padding`]).
///
/// # Panics
///
/// Panics if `ciphertext.len()` is not a multiple of 16.
pub fn aes128_cbc_decrypt(key: &[u8; 16], iv: &[u8; 16], ciphertext: &[u8]) -> Vec<u8> {
    assert!(
        ciphertext.len().is_multiple_of(16),
        "aes128_cbc_decrypt requires block-aligned input, got {} bytes",
        ciphertext.len()
    );
    let mut buf = ciphertext.to_vec();
    aes128_cbc_decrypt_in_place(key, iv, &mut buf);
    buf
}

/// Decrypt `buf` with AES-128-CBC in place, leaving the (still padded)
/// plaintext where the ciphertext was.
///
/// This is the primitive the ingress engine uses to satisfy the "decrypt in
/// place over the ciphertext region" requirement of spec §4.5 step 4.
///
/// # Panics
///
/// Panics if `buf.len()` is not a multiple of 16.
pub fn aes128_cbc_decrypt_in_place(key: &[u8; 16], iv: &[u8; 16], buf: &mut [u8]) {
    assert!(
        buf.len().is_multiple_of(16),
        "aes128_cbc_decrypt_in_place requires block-aligned input, got {} bytes",
        buf.len()
    );
    let decryptor = Aes128CbcDec::new(key.into(), iv.into());
    decryptor
        .decrypt_padded_mut::<NoPadding>(buf)
        .expect("block-aligned buffer cannot fail NoPadding decryption");
}

/// SHA-256 over an arbitrary byte range.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let digest = ring::digest::digest(&ring::digest::SHA256, bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_ref());
    out
}

/// HMAC-SHA-256 over an arbitrary byte range with a 16-byte key.
pub fn hmac_sha256(key: &[u8; 16], bytes: &[u8]) -> [u8; 32] {
    let hmac_key = hmac::Key::new(hmac::HMAC_SHA256, key);
    let tag = hmac::sign(&hmac_key, bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Draw `N` bytes from the process CSPRNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    rand::rng().fill_bytes(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbc_round_trip() {
        let key = [0x11u8; 16];
        let iv = [0x22u8; 16];
        let plaintext = [0x33u8; 32];

        let ciphertext = aes128_cbc_encrypt(&key, &iv, &plaintext);
        assert_eq!(ciphertext.len(), plaintext.len());
        assert_ne!(ciphertext, plaintext);

        let decrypted = aes128_cbc_decrypt(&key, &iv, &ciphertext);
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn sha256_matches_known_vector() {
        // SHA-256("") per FIPS 180-4 test vectors.
        let digest = sha256(b"");
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn hmac_sha256_is_deterministic() {
        let key = [0x44u8; 16];
        let a = hmac_sha256(&key, b"hello");
        let b = hmac_sha256(&key, b"hello");
        assert_eq!(a, b);
        let c = hmac_sha256(&key, b"hellp");
        assert_ne!(a, c);
    }

    #[test]
    fn random_bytes_are_not_constant() {
        let a: [u8; 16] = random_bytes();
        let b: [u8; 16] = random_bytes();
        assert_ne!(a, b);
    }
}
