//! Validation gate for documents arriving from untrusted channels.
//!
//! [`try_decode`] runs the full parse + decrypt + type check and reports the
//! outcome as a [`ValidationResult`]. It never returns an `Err`, so attacker
//! controlled ciphertext cannot push an error into the caller's control flow,
//! and a failed decode never yields a partially populated record.
//!
//! # Telemetry invariants
//!
//! - Rejections are logged with the record name, the failing alias and the
//!   reason code only. Error messages are not logged because JSON parse
//!   errors may quote document content.

use common::{FailureReason, ValidationResult};
use serde_json::Value;
use tracing::{debug, warn};

use crate::convert::ConvertError;
use crate::crypto::CipherEngine;
use crate::schema::{document, ConverterBinding, FieldSet, SecureRecord};

/// Decode `raw` into `R`, collapsing every failure into a reason code.
pub fn try_decode<R: SecureRecord>(engine: &CipherEngine, raw: &str) -> ValidationResult<R> {
    let binding = R::binding();
    let outcome = decode_document(engine, binding, raw).and_then(R::from_fields);
    report(binding, outcome)
}

/// Decode `raw` against an explicit `binding`, yielding the raw [`FieldSet`].
///
/// For callers that work with bindings built at runtime rather than a
/// [`SecureRecord`] type.
pub fn try_decode_fields(
    engine: &CipherEngine,
    binding: &ConverterBinding,
    raw: &str,
) -> ValidationResult<FieldSet> {
    report(binding, decode_document(engine, binding, raw))
}

fn decode_document(
    engine: &CipherEngine,
    binding: &ConverterBinding,
    raw: &str,
) -> Result<FieldSet, ConvertError> {
    let doc: Value = serde_json::from_str(raw)?;
    document::decode_fields(engine, binding, &doc)
}

fn report<T>(binding: &ConverterBinding, outcome: Result<T, ConvertError>) -> ValidationResult<T> {
    match outcome {
        Ok(value) => {
            debug!(record = binding.record(), "document accepted");
            ValidationResult::valid(value)
        }
        Err(e) => {
            let reason: FailureReason = e.reason();
            warn!(
                record = binding.record(),
                field = e.field().unwrap_or("-"),
                reason = reason.code(),
                "document rejected"
            );
            ValidationResult::invalid(reason)
        }
    }
}
