//! Transparent field-level authenticated encryption for JSON records.
//!
//! A record declares which of its fields are sensitive through a
//! [`ConverterBinding`]. On encode, each sealed field is replaced by a
//! self-describing envelope (`v1.<nonce>.<ciphertext||tag>`) produced by
//! AES-256-GCM-SIV under a key derived once from a password with Argon2id.
//! On decode every envelope must authenticate against the key and its
//! `<record>.<alias>:<kind>` associated data, or the whole document is
//! rejected.
//!
//! Untrusted input goes through [`SecureJson::try_decode`] (or
//! [`gate::try_decode`]), which reports a [`ValidationResult`] and never
//! surfaces an error.

pub mod config;
pub mod convert;
pub mod crypto;
pub mod gate;
pub mod registry;
pub mod schema;
mod secure_json;
pub mod telemetry;

pub use common::{FailureReason, ValidationResult};
pub use convert::{ConvertError, FieldKind, FieldValue};
pub use crypto::{CipherEngine, KdfParams, KeyMaterial, Salt};
pub use registry::Registry;
pub use schema::{ConverterBinding, FieldBinding, FieldSet, Protection, SecureRecord};
pub use secure_json::{Secret, SecureJson, SecureJsonExt};
