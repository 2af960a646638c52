//! Key derivation, AES-256-GCM-SIV field encryption, and envelope framing.
//!
//! This module knows nothing about JSON or records. It turns a password (or
//! raw key) into [`KeyMaterial`], seals byte payloads into [`CipherEnvelope`]s
//! bound to caller-supplied associated data, and frames envelopes as text.
//!
//! # Ciphertext format
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```
//!
//! The `v1` prefix enables future algorithm migration without breaking
//! existing ciphertext.
//!
//! # Security invariants
//!
//! - Key bytes are never logged, serialised, or printed by `Debug`, and are
//!   zeroed when the last [`KeyMaterial`] handle is dropped.
//! - A failed tag check is final. There is no plaintext fallback.

pub mod cipher;
pub mod envelope;
pub mod kdf;

pub use cipher::{CipherEngine, CipherError, KEY_LEN};
pub use envelope::{CipherEnvelope, EnvelopeError, EnvelopeVersion};
pub use kdf::{KdfAlgorithm, KdfError, KdfParams, KeyMaterial, Salt};
