//! Result types handed back across the untrusted-input boundary.

use serde::Serialize;

use crate::error::FailureReason;

/// Outcome of decoding an untrusted document.
///
/// Either `value` is present and `failure` is absent, or the reverse. The
/// constructors are the only way to build one, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult<T> {
    success: bool,
    value: Option<T>,
    failure_reason: Option<FailureReason>,
}

impl<T> ValidationResult<T> {
    /// A successful decode carrying the fully populated value.
    pub fn valid(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            failure_reason: None,
        }
    }

    /// A failed decode. No value, partial or otherwise, is retained.
    pub fn invalid(reason: FailureReason) -> Self {
        Self {
            success: false,
            value: None,
            failure_reason: Some(reason),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure_reason
    }

    /// Consume the result, keeping only the decoded value.
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Convert into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<T, FailureReason> {
        match (self.value, self.failure_reason) {
            (Some(v), _) => Ok(v),
            (None, Some(reason)) => Err(reason),
            // Unreachable through the constructors; treat as a generic shape failure.
            (None, None) => Err(FailureReason::MalformedDocument),
        }
    }
}

impl<T> From<Result<T, FailureReason>> for ValidationResult<T> {
    fn from(res: Result<T, FailureReason>) -> Self {
        match res {
            Ok(v) => Self::valid(v),
            Err(reason) => Self::invalid(reason),
        }
    }
}
