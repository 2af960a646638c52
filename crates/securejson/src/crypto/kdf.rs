//! Password-based key derivation (Argon2id) and the immutable [`KeyMaterial`] it yields.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use zeroize::Zeroizing;

use super::cipher::KEY_LEN;

/// Length of a freshly generated salt.
pub const SALT_LEN: usize = 16;

/// Shortest salt Argon2 accepts.
pub const MIN_SALT_LEN: usize = 8;

/// Errors produced while building key material.
#[derive(Debug, Error)]
pub enum KdfError {
    /// The password, salt or raw key was rejected before derivation.
    #[error("weak key input: {0}")]
    WeakInput(&'static str),

    /// The Argon2 cost parameters are out of range.
    #[error("invalid key derivation parameters: {0}")]
    InvalidParams(String),

    /// Argon2 itself failed.
    #[error("key derivation failed")]
    DerivationFailed,
}

/// Which function produced the key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfAlgorithm {
    /// Argon2id, version 0x13.
    Argon2id,
    /// Caller supplied the key directly; no derivation took place.
    Raw,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Minimal cost parameters. Only fit for tests.
    #[cfg(test)]
    pub(crate) fn insecure_fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn to_argon2(self) -> Result<Params, KdfError> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| KdfError::InvalidParams(e.to_string()))
    }
}

/// Random, non-secret salt fed into key derivation.
///
/// The salt must be stored next to anything encrypted with the derived key;
/// without it the key cannot be re-derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Generate [`SALT_LEN`] bytes from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing salt bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KdfError::WeakInput`] if fewer than [`MIN_SALT_LEN`] bytes are given.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, KdfError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SALT_LEN {
            return Err(KdfError::WeakInput("salt is too short"));
        }
        Ok(Self(bytes))
    }

    /// Parse a salt persisted as standard base64.
    pub fn from_base64(s: &str) -> Result<Self, KdfError> {
        let bytes = STANDARD
            .decode(s.trim())
            .map_err(|_| KdfError::WeakInput("salt is not valid base64"))?;
        Self::from_bytes(bytes)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Derived key plus the parameters that produced it.
///
/// Immutable once built. The key bytes are wiped when the value is dropped
/// and never appear in `Debug` output.
pub struct KeyMaterial {
    key: Zeroizing<[u8; KEY_LEN]>,
    salt: Option<Salt>,
    params: Option<KdfParams>,
    algorithm: KdfAlgorithm,
}

impl KeyMaterial {
    /// Derive a key from `password` and `salt` with Argon2id.
    ///
    /// This is deliberately slow; do it once at startup.
    ///
    /// # Errors
    ///
    /// - [`KdfError::WeakInput`] if `password` is empty.
    /// - [`KdfError::InvalidParams`] if `params` are rejected by Argon2.
    pub fn derive(password: &str, salt: &Salt, params: KdfParams) -> Result<Self, KdfError> {
        if password.is_empty() {
            return Err(KdfError::WeakInput("password is empty"));
        }
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        argon2
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut *key)
            .map_err(|_| KdfError::DerivationFailed)?;

        Ok(Self {
            key,
            salt: Some(salt.clone()),
            params: Some(params),
            algorithm: KdfAlgorithm::Argon2id,
        })
    }

    /// Use `key_bytes` directly as the cipher key.
    ///
    /// # Errors
    ///
    /// Returns [`KdfError::WeakInput`] unless exactly [`KEY_LEN`] bytes are given.
    pub fn from_raw_key(key_bytes: &[u8]) -> Result<Self, KdfError> {
        if key_bytes.len() != KEY_LEN {
            return Err(KdfError::WeakInput("raw key must be 32 bytes"));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(key_bytes);
        Ok(Self {
            key,
            salt: None,
            params: None,
            algorithm: KdfAlgorithm::Raw,
        })
    }

    pub fn algorithm(&self) -> KdfAlgorithm {
        self.algorithm
    }

    /// Salt used for derivation; `None` for raw keys.
    pub fn salt(&self) -> Option<&Salt> {
        self.salt.as_ref()
    }

    /// Cost parameters used for derivation; `None` for raw keys.
    pub fn params(&self) -> Option<KdfParams> {
        self.params
    }

    pub(crate) fn key_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("params", &self.params)
            .finish()
    }
}
