//! The closed set of field kinds and the values they carry.

use std::net::IpAddr;

use chrono::{DateTime, TimeZone, Utc};

/// Semantic type of a bound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Timestamp,
    AddressList,
}

impl FieldKind {
    /// Stable tag used in associated data and diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Timestamp => "timestamp",
            FieldKind::AddressList => "address-list",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A typed field value on its way to or from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    /// Always held in UTC; see [`FieldValue::timestamp`].
    Timestamp(DateTime<Utc>),
    AddressList(Vec<IpAddr>),
}

impl FieldValue {
    /// Build a timestamp value, normalising any timezone to UTC.
    pub fn timestamp<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        FieldValue::Timestamp(instant.with_timezone(&Utc))
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::AddressList(_) => FieldKind::AddressList,
        }
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_owned())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl From<Vec<IpAddr>> for FieldValue {
    fn from(v: Vec<IpAddr>) -> Self {
        FieldValue::AddressList(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn timestamp_normalised_to_utc() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = plus_two.with_ymd_and_hms(2001, 7, 16, 2, 0, 0).unwrap();
        let FieldValue::Timestamp(utc) = FieldValue::timestamp(local) else {
            panic!("expected timestamp");
        };
        assert_eq!(utc, Utc.with_ymd_and_hms(2001, 7, 16, 0, 0, 0).unwrap());
        assert_eq!(utc, local);
    }

    #[test]
    fn kinds_and_tags() {
        assert_eq!(FieldValue::from("x").kind(), FieldKind::String);
        assert_eq!(FieldValue::from(5i32).kind(), FieldKind::Integer);
        assert_eq!(FieldValue::from(Vec::<IpAddr>::new()).kind(), FieldKind::AddressList);
        assert_eq!(FieldKind::AddressList.tag(), "address-list");
        assert_eq!(FieldKind::Timestamp.to_string(), "timestamp");
    }
}
