//! Shared failure taxonomy and validation result types for `securejson` crates.

pub mod error;
pub mod protocol;

pub use error::FailureReason;
pub use protocol::ValidationResult;
