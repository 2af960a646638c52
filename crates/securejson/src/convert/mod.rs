//! Typed field converters: value ⇄ bytes ⇄ sealed envelope text.
//!
//! Dispatch is a `match` over the closed [`FieldKind`] set. Every decode
//! distinguishes three outcomes:
//!
//! - the tag did not verify ([`ConvertError::Cipher`] → `authentication_failed`),
//! - the tag verified but the plaintext is not a valid value
//!   ([`ConvertError::Corrupt`] → `corrupt_data`),
//! - success.
//!
//! # Associated data
//!
//! Each envelope is bound to `<record>.<alias>:<kind>`, so an envelope copied
//! into another field, another record type, or read as another kind fails
//! authentication.

mod address;
mod payload;
pub mod value;

pub use value::{FieldKind, FieldValue};

use common::FailureReason;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::{CipherEngine, CipherEnvelope, CipherError, EnvelopeError, KdfError};

/// Errors from converting fields and documents.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Key material could not be built.
    #[error(transparent)]
    Kdf(#[from] KdfError),

    /// AEAD failure for one field: on decode, the tag did not verify.
    #[error("field `{field}`: {source}")]
    Cipher {
        field: String,
        #[source]
        source: CipherError,
    },

    /// The envelope text for one field could not be parsed.
    #[error("field `{field}`: {source}")]
    Envelope {
        field: String,
        #[source]
        source: EnvelopeError,
    },

    /// Decryption succeeded but the payload is not a valid value of the declared kind.
    #[error("field `{field}` is corrupt: {reason}")]
    Corrupt { field: String, reason: &'static str },

    /// A value of one kind was supplied or requested where another was declared.
    #[error("field `{field}`: expected {expected}, found {found}")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    /// A required field is absent.
    #[error("required field `{0}` is missing")]
    MissingField(String),

    /// The outer document has the wrong shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The outer document is not valid JSON.
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Collapse this error into the shared reason taxonomy.
    pub fn reason(&self) -> FailureReason {
        match self {
            ConvertError::Kdf(_) => FailureReason::WeakInput,
            ConvertError::Cipher { source, .. } => match source {
                CipherError::AuthenticationFailed => FailureReason::AuthenticationFailed,
                CipherError::EncryptionFailed => FailureReason::CorruptData,
            },
            ConvertError::Envelope { source, .. } => match source {
                EnvelopeError::Malformed(_) => FailureReason::MalformedEnvelope,
                EnvelopeError::UnknownVersion(_) => FailureReason::UnknownVersion,
            },
            ConvertError::Corrupt { .. } | ConvertError::KindMismatch { .. } => {
                FailureReason::CorruptData
            }
            ConvertError::MissingField(_) => FailureReason::MissingField,
            ConvertError::MalformedDocument(_) | ConvertError::Json(_) => {
                FailureReason::MalformedDocument
            }
        }
    }

    /// Alias of the field that failed, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConvertError::Cipher { field, .. }
            | ConvertError::Envelope { field, .. }
            | ConvertError::Corrupt { field, .. }
            | ConvertError::KindMismatch { field, .. }
            | ConvertError::MissingField(field) => Some(field),
            ConvertError::Kdf(_) | ConvertError::MalformedDocument(_) | ConvertError::Json(_) => {
                None
            }
        }
    }
}

/// Identifies where a sealed value lives; feeds the associated data.
#[derive(Debug, Clone, Copy)]
pub struct FieldSlot<'a> {
    pub record: &'a str,
    pub alias: &'a str,
    pub kind: FieldKind,
}

impl FieldSlot<'_> {
    pub fn associated_data(&self) -> Vec<u8> {
        format!("{}.{}:{}", self.record, self.alias, self.kind.tag()).into_bytes()
    }
}

/// Encrypt `value` into envelope text for `slot`.
///
/// # Errors
///
/// - [`ConvertError::KindMismatch`] if `value` is not of `slot.kind`.
/// - [`ConvertError::Cipher`] if the AEAD refuses the payload.
pub fn seal(
    engine: &CipherEngine,
    slot: FieldSlot<'_>,
    value: &FieldValue,
) -> Result<String, ConvertError> {
    if value.kind() != slot.kind {
        return Err(ConvertError::KindMismatch {
            field: slot.alias.to_owned(),
            expected: slot.kind,
            found: value.kind(),
        });
    }
    let plaintext = payload::to_bytes(value);
    let envelope = engine
        .encrypt(&slot.associated_data(), &plaintext)
        .map_err(|source| ConvertError::Cipher {
            field: slot.alias.to_owned(),
            source,
        })?;
    Ok(envelope.frame())
}

/// Decrypt envelope `text` for `slot` back into a typed value.
///
/// # Errors
///
/// - [`ConvertError::Envelope`] if `text` is not a parseable envelope.
/// - [`ConvertError::Cipher`] if authentication fails.
/// - [`ConvertError::Corrupt`] if the authenticated payload is invalid for `slot.kind`.
pub fn open(
    engine: &CipherEngine,
    slot: FieldSlot<'_>,
    text: &str,
) -> Result<FieldValue, ConvertError> {
    let envelope = CipherEnvelope::parse(text).map_err(|source| ConvertError::Envelope {
        field: slot.alias.to_owned(),
        source,
    })?;
    let plaintext = Zeroizing::new(
        engine
            .decrypt(&slot.associated_data(), &envelope)
            .map_err(|source| ConvertError::Cipher {
                field: slot.alias.to_owned(),
                source,
            })?,
    );
    payload::from_bytes(slot.kind, &plaintext).map_err(|reason| ConvertError::Corrupt {
        field: slot.alias.to_owned(),
        reason,
    })
}
