//! [`FieldSet`]: typed values keyed by wire alias.

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};

use crate::convert::{ConvertError, FieldKind, FieldValue};

/// Values of one record, keyed by the alias declared in its binding.
///
/// Records fill one in [`SecureRecord::to_fields`](super::SecureRecord::to_fields)
/// and drain one in [`SecureRecord::from_fields`](super::SecureRecord::from_fields)
/// through the typed `take_*` / `require_*` accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: BTreeMap<String, FieldValue>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `alias` to `value`, replacing any previous value.
    pub fn insert(&mut self, alias: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.values.insert(alias.into(), value.into());
        self
    }

    /// Set `alias` only if `value` is present. `None` leaves the field absent.
    pub fn insert_opt<V: Into<FieldValue>>(
        &mut self,
        alias: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(v) = value {
            self.values.insert(alias.into(), v.into());
        }
        self
    }

    pub fn get(&self, alias: &str) -> Option<&FieldValue> {
        self.values.get(alias)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn take_string(&mut self, alias: &str) -> Result<Option<String>, ConvertError> {
        Ok(match self.take_kind(alias, FieldKind::String)? {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        })
    }

    pub fn take_integer(&mut self, alias: &str) -> Result<Option<i64>, ConvertError> {
        Ok(match self.take_kind(alias, FieldKind::Integer)? {
            Some(FieldValue::Integer(n)) => Some(n),
            _ => None,
        })
    }

    /// Take an integer and narrow it to `i32`.
    ///
    /// A value that does not fit is corrupt; it is never clamped.
    pub fn take_i32(&mut self, alias: &str) -> Result<Option<i32>, ConvertError> {
        self.take_integer(alias)?
            .map(|n| {
                i32::try_from(n).map_err(|_| ConvertError::Corrupt {
                    field: alias.to_owned(),
                    reason: "integer is out of range",
                })
            })
            .transpose()
    }

    pub fn take_timestamp(&mut self, alias: &str) -> Result<Option<DateTime<Utc>>, ConvertError> {
        Ok(match self.take_kind(alias, FieldKind::Timestamp)? {
            Some(FieldValue::Timestamp(ts)) => Some(ts),
            _ => None,
        })
    }

    pub fn take_addresses(&mut self, alias: &str) -> Result<Option<Vec<IpAddr>>, ConvertError> {
        Ok(match self.take_kind(alias, FieldKind::AddressList)? {
            Some(FieldValue::AddressList(list)) => Some(list),
            _ => None,
        })
    }

    pub fn require_string(&mut self, alias: &str) -> Result<String, ConvertError> {
        self.take_string(alias)?.ok_or_else(|| missing(alias))
    }

    pub fn require_integer(&mut self, alias: &str) -> Result<i64, ConvertError> {
        self.take_integer(alias)?.ok_or_else(|| missing(alias))
    }

    pub fn require_i32(&mut self, alias: &str) -> Result<i32, ConvertError> {
        self.take_i32(alias)?.ok_or_else(|| missing(alias))
    }

    pub fn require_timestamp(&mut self, alias: &str) -> Result<DateTime<Utc>, ConvertError> {
        self.take_timestamp(alias)?.ok_or_else(|| missing(alias))
    }

    pub fn require_addresses(&mut self, alias: &str) -> Result<Vec<IpAddr>, ConvertError> {
        self.take_addresses(alias)?.ok_or_else(|| missing(alias))
    }

    fn take_kind(
        &mut self,
        alias: &str,
        kind: FieldKind,
    ) -> Result<Option<FieldValue>, ConvertError> {
        match self.values.remove(alias) {
            None => Ok(None),
            Some(v) if v.kind() == kind => Ok(Some(v)),
            Some(v) => Err(ConvertError::KindMismatch {
                field: alias.to_owned(),
                expected: kind,
                found: v.kind(),
            }),
        }
    }
}

fn missing(alias: &str) -> ConvertError {
    ConvertError::MissingField(alias.to_owned())
}
