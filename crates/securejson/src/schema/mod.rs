//! Converter bindings: the statically declared field table of a record type.
//!
//! A [`ConverterBinding`] lists, for one record type, every wire alias, its
//! [`FieldKind`], whether it is sealed, and whether it is required. It is built
//! once (usually inside a `OnceLock`) and never changes afterwards, so it can
//! be shared by every encode and decode without locking.
//!
//! # Module invariants
//!
//! - **No JSON values leave this module half-decoded.** [`document::decode_fields`]
//!   either returns every bound field or an error.
//! - Record names and aliases never contain `.` or `:`, which delimit the
//!   associated data.

pub mod document;
pub mod fields;

pub use fields::FieldSet;

use thiserror::Error;

use crate::convert::{ConvertError, FieldKind, FieldSlot};

/// Errors from building a [`ConverterBinding`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    /// Two fields share an alias (compared case-insensitively).
    #[error("duplicate alias: {0}")]
    DuplicateAlias(String),

    /// A record name or alias is empty or contains a reserved character.
    #[error("invalid name: {0:?}")]
    InvalidName(String),
}

/// How a field appears in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Encrypted envelope text.
    Sealed,
    /// Native JSON value, readable by anyone holding the document.
    Plain,
}

/// One row of a [`ConverterBinding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub alias: String,
    pub kind: FieldKind,
    pub protection: Protection,
    pub required: bool,
}

impl FieldBinding {
    /// An optional, encrypted field.
    pub fn sealed(alias: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            alias: alias.into(),
            kind,
            protection: Protection::Sealed,
            required: false,
        }
    }

    /// An optional field written as a plain JSON value.
    pub fn plain(alias: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            alias: alias.into(),
            kind,
            protection: Protection::Plain,
            required: false,
        }
    }

    /// Mark the field as required on both encode and decode.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Immutable field table for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterBinding {
    record: String,
    fields: Vec<FieldBinding>,
}

impl ConverterBinding {
    /// Build a binding, checking names and alias uniqueness.
    ///
    /// # Errors
    ///
    /// - [`BindingError::InvalidName`] for an empty name or one containing `.` or `:`.
    /// - [`BindingError::DuplicateAlias`] if two aliases differ only in ASCII case or not at all.
    pub fn try_new(
        record: impl Into<String>,
        fields: Vec<FieldBinding>,
    ) -> Result<Self, BindingError> {
        let record = record.into();
        check_name(&record)?;
        for (i, field) in fields.iter().enumerate() {
            check_name(&field.alias)?;
            if fields[..i]
                .iter()
                .any(|prev| prev.alias.eq_ignore_ascii_case(&field.alias))
            {
                return Err(BindingError::DuplicateAlias(field.alias.clone()));
            }
        }
        Ok(Self { record, fields })
    }

    /// Build a binding from a static declaration.
    ///
    /// # Panics
    ///
    /// Panics if [`ConverterBinding::try_new`] would fail. Bindings are written
    /// by hand next to their record type, so a bad one is a programming error.
    pub fn new(record: impl Into<String>, fields: Vec<FieldBinding>) -> Self {
        match Self::try_new(record, fields) {
            Ok(binding) => binding,
            Err(e) => panic!("invalid converter binding: {e}"),
        }
    }

    pub fn record(&self) -> &str {
        &self.record
    }

    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// Look up a field by its exact alias.
    pub fn field(&self, alias: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|f| f.alias == alias)
    }

    pub(crate) fn slot<'a>(&'a self, field: &'a FieldBinding) -> FieldSlot<'a> {
        FieldSlot {
            record: &self.record,
            alias: &field.alias,
            kind: field.kind,
        }
    }
}

fn check_name(name: &str) -> Result<(), BindingError> {
    if name.is_empty() || name.contains(['.', ':']) {
        return Err(BindingError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// A record type that can be written to and read from a protected document.
///
/// Implementors map their properties to wire aliases; the binding decides
/// how each alias is protected.
pub trait SecureRecord: Sized {
    /// The record's field table. Build it once and hand out the same reference.
    fn binding() -> &'static ConverterBinding;

    /// Collect the record's values by alias. Absent optional values are left out.
    fn to_fields(&self) -> FieldSet;

    /// Rebuild the record from decoded values.
    ///
    /// # Errors
    ///
    /// Implementations return [`ConvertError::MissingField`] for a required
    /// value they cannot find and [`ConvertError::Corrupt`] for a value that
    /// does not fit the property type.
    fn from_fields(fields: FieldSet) -> Result<Self, ConvertError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_alias_rejected_case_insensitively() {
        let err = ConverterBinding::try_new(
            "Profile",
            vec![
                FieldBinding::sealed("a", FieldKind::String),
                FieldBinding::sealed("A", FieldKind::Integer),
            ],
        )
        .unwrap_err();
        assert_eq!(err, BindingError::DuplicateAlias("A".into()));
    }

    #[test]
    fn reserved_characters_rejected() {
        assert!(matches!(
            ConverterBinding::try_new("Pro.file", vec![]),
            Err(BindingError::InvalidName(_))
        ));
        assert!(matches!(
            ConverterBinding::try_new("Profile", vec![FieldBinding::plain("a:b", FieldKind::String)]),
            Err(BindingError::InvalidName(_))
        ));
        assert!(matches!(
            ConverterBinding::try_new("Profile", vec![FieldBinding::plain("", FieldKind::String)]),
            Err(BindingError::InvalidName(_))
        ));
    }

    #[test]
    fn builder_flags() {
        let f = FieldBinding::sealed("c", FieldKind::Timestamp).required();
        assert!(f.required);
        assert_eq!(f.protection, Protection::Sealed);
        assert!(!FieldBinding::plain("x", FieldKind::Integer).required);
    }

    #[test]
    fn field_lookup() {
        let b = ConverterBinding::new(
            "Profile",
            vec![
                FieldBinding::sealed("a", FieldKind::String),
                FieldBinding::plain("v", FieldKind::Integer),
            ],
        );
        assert_eq!(b.record(), "Profile");
        assert_eq!(b.fields().len(), 2);
        assert_eq!(b.field("v").map(|f| f.kind), Some(FieldKind::Integer));
        assert!(b.field("z").is_none());
    }

    #[test]
    #[should_panic(expected = "invalid converter binding")]
    fn new_panics_on_bad_binding() {
        let _ = ConverterBinding::new(
            "Profile",
            vec![
                FieldBinding::sealed("a", FieldKind::String),
                FieldBinding::sealed("a", FieldKind::String),
            ],
        );
    }
}
