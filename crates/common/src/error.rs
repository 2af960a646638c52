//! Failure taxonomy shared across crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why decoding or key setup failed.
///
/// Every internal error collapses into exactly one of these reasons. Variants
/// map to stable machine-readable codes (see [`FailureReason::code`]) that are
/// safe to log or return to callers; none of them carry field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Key material input was rejected (empty password, short salt, bad key length).
    #[error("weak or invalid key material input")]
    WeakInput,

    /// The authentication tag did not verify: tampering, wrong key, or a
    /// ciphertext moved to another field.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Decryption succeeded but the plaintext has an invalid shape.
    #[error("decrypted payload is corrupt")]
    CorruptData,

    /// The envelope text could not be parsed.
    #[error("malformed envelope")]
    MalformedEnvelope,

    /// The envelope names a format version this build does not know.
    #[error("unknown envelope version")]
    UnknownVersion,

    /// The outer document is not a JSON object or a plain field has the wrong JSON type.
    #[error("malformed document")]
    MalformedDocument,

    /// A required field is absent from the document.
    #[error("required field missing")]
    MissingField,
}

impl FailureReason {
    /// Returns the stable reason code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::WeakInput => "weak_input",
            FailureReason::AuthenticationFailed => "authentication_failed",
            FailureReason::CorruptData => "corrupt_data",
            FailureReason::MalformedEnvelope => "malformed_envelope",
            FailureReason::UnknownVersion => "unknown_version",
            FailureReason::MalformedDocument => "malformed_document",
            FailureReason::MissingField => "missing_field",
        }
    }

    /// Returns `true` if the failure came from the cryptographic check itself
    /// rather than from the shape of the input.
    pub fn is_authentication(&self) -> bool {
        matches!(self, FailureReason::AuthenticationFailed)
    }
}
