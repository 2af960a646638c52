//! AES-256-GCM-SIV encryption and decryption of individual field payloads.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant,
//! so an accidental nonce collision leaks equality of plaintexts rather than
//! the key stream. Nonces are still drawn fresh from the OS CSPRNG on every
//! call; no counter is kept, so independent processes sharing a key need no
//! coordination.
//!
//! The associated data passed to [`encrypt`] and [`decrypt`] is authenticated
//! but not encrypted. Field codecs put the record name, field alias and field
//! kind there so that an envelope only opens in the slot it was written for.

use std::sync::Arc;

use aes_gcm_siv::{
    aead::{generic_array::GenericArray, rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256GcmSiv, Nonce, Tag,
};
use thiserror::Error;
use tracing::debug;

use super::envelope::{CipherEnvelope, EnvelopeVersion};
use super::kdf::KeyMaterial;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM-SIV authentication tag.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The tag did not verify. Terminal for the field: the ciphertext is
    /// never handed back as if it were plaintext.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// AES-GCM-SIV refused to encrypt (payload exceeds the AEAD limits).
    #[error("aead encryption failed")]
    EncryptionFailed,
}

/// Encrypt `plaintext` under `key`, binding `associated_data` into the tag.
///
/// # Errors
///
/// Returns [`CipherError::EncryptionFailed`] only if the AEAD rejects the
/// input length, which cannot happen for field-sized payloads.
pub fn encrypt(
    key: &KeyMaterial,
    associated_data: &[u8],
    plaintext: &[u8],
) -> Result<CipherEnvelope, CipherError> {
    let cipher = build_cipher(key);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), associated_data, &mut buffer)
        .map_err(|_| CipherError::EncryptionFailed)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(CipherEnvelope {
        version: EnvelopeVersion::V1,
        nonce,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt `envelope` under `key`, verifying the tag over the ciphertext and
/// `associated_data`.
///
/// # Errors
///
/// Returns [`CipherError::AuthenticationFailed`] if the tag does not verify:
/// wrong key, tampered bytes, or associated data that differs from the one
/// used at encryption time.
pub fn decrypt(
    key: &KeyMaterial,
    associated_data: &[u8],
    envelope: &CipherEnvelope,
) -> Result<Vec<u8>, CipherError> {
    match envelope.version {
        EnvelopeVersion::V1 => {
            let cipher = build_cipher(key);
            let mut buffer = envelope.ciphertext.clone();
            cipher
                .decrypt_in_place_detached(
                    Nonce::from_slice(&envelope.nonce),
                    associated_data,
                    &mut buffer,
                    Tag::from_slice(&envelope.tag),
                )
                .map_err(|_| CipherError::AuthenticationFailed)?;
            Ok(buffer)
        }
    }
}

fn build_cipher(key: &KeyMaterial) -> Aes256GcmSiv {
    Aes256GcmSiv::new(GenericArray::from_slice(key.key_bytes()))
}

/// Shareable handle binding [`encrypt`]/[`decrypt`] to one [`KeyMaterial`].
///
/// Cloning is cheap; the key material lives behind an `Arc` and is read-only,
/// so an engine can be used from many threads at once without locking.
#[derive(Clone, Debug)]
pub struct CipherEngine {
    key: Arc<KeyMaterial>,
}

impl CipherEngine {
    pub fn new(key: KeyMaterial) -> Self {
        debug!(algorithm = ?key.algorithm(), "cipher engine configured");
        Self { key: Arc::new(key) }
    }

    pub fn key_material(&self) -> &KeyMaterial {
        &self.key
    }

    /// See [`encrypt`].
    pub fn encrypt(
        &self,
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<CipherEnvelope, CipherError> {
        encrypt(&self.key, associated_data, plaintext)
    }

    /// See [`decrypt`].
    pub fn decrypt(
        &self,
        associated_data: &[u8],
        envelope: &CipherEnvelope,
    ) -> Result<Vec<u8>, CipherError> {
        decrypt(&self.key, associated_data, envelope)
    }
}
