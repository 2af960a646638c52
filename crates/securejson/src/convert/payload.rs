//! Plaintext byte encodings for each [`FieldKind`].

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::address;
use super::value::{FieldKind, FieldValue};

const INTEGER_LEN: usize = 8;
const TIMESTAMP_LEN: usize = 12;

/// Serialise `value` into the bytes that get encrypted.
///
/// The buffer is wiped when dropped.
pub(crate) fn to_bytes(value: &FieldValue) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::new());
    match value {
        FieldValue::String(s) => out.extend_from_slice(s.as_bytes()),
        FieldValue::Integer(n) => out.extend_from_slice(&n.to_be_bytes()),
        FieldValue::Timestamp(ts) => {
            out.extend_from_slice(&ts.timestamp().to_be_bytes());
            out.extend_from_slice(&ts.timestamp_subsec_nanos().to_be_bytes());
        }
        FieldValue::AddressList(list) => address::encode(list, &mut out),
    }
    out
}

/// Rebuild a value of `kind` from decrypted bytes.
///
/// An `Err` means the bytes authenticated but do not describe a valid value.
pub(crate) fn from_bytes(kind: FieldKind, bytes: &[u8]) -> Result<FieldValue, &'static str> {
    match kind {
        FieldKind::String => std::str::from_utf8(bytes)
            .map(|s| FieldValue::String(s.to_owned()))
            .map_err(|_| "string is not valid UTF-8"),
        FieldKind::Integer => {
            let buf: [u8; INTEGER_LEN] = bytes
                .try_into()
                .map_err(|_| "integer payload has the wrong width")?;
            Ok(FieldValue::Integer(i64::from_be_bytes(buf)))
        }
        FieldKind::Timestamp => {
            if bytes.len() != TIMESTAMP_LEN {
                return Err("timestamp payload has the wrong width");
            }
            let (secs, nanos) = bytes.split_at(8);
            let mut secs_buf = [0u8; 8];
            secs_buf.copy_from_slice(secs);
            let mut nanos_buf = [0u8; 4];
            nanos_buf.copy_from_slice(nanos);
            let secs = i64::from_be_bytes(secs_buf);
            let nanos = u32::from_be_bytes(nanos_buf);
            DateTime::<Utc>::from_timestamp(secs, nanos)
                .map(FieldValue::Timestamp)
                .ok_or("timestamp is out of range")
        }
        FieldKind::AddressList => address::decode(bytes).map(FieldValue::AddressList),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn integer_is_fixed_width() {
        let bytes = to_bytes(&FieldValue::Integer(-42));
        assert_eq!(bytes.len(), INTEGER_LEN);
        assert_eq!(
            from_bytes(FieldKind::Integer, &bytes).unwrap(),
            FieldValue::Integer(-42)
        );
    }

    #[test]
    fn integer_of_wrong_width_is_corrupt() {
        assert!(from_bytes(FieldKind::Integer, &[0u8; 4]).is_err());
        assert!(from_bytes(FieldKind::Integer, &[0u8; 9]).is_err());
    }

    #[test]
    fn timestamp_keeps_exact_instant() {
        let ts = Utc.with_ymd_and_hms(2001, 7, 16, 0, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let bytes = to_bytes(&FieldValue::Timestamp(ts));
        assert_eq!(bytes.len(), TIMESTAMP_LEN);
        assert_eq!(
            from_bytes(FieldKind::Timestamp, &bytes).unwrap(),
            FieldValue::Timestamp(ts)
        );
    }

    #[test]
    fn pre_epoch_timestamp_round_trips() {
        let ts = Utc.with_ymd_and_hms(1901, 12, 31, 23, 59, 59).unwrap();
        let bytes = to_bytes(&FieldValue::Timestamp(ts));
        assert_eq!(
            from_bytes(FieldKind::Timestamp, &bytes).unwrap(),
            FieldValue::Timestamp(ts)
        );
    }

    #[test]
    fn impossible_timestamp_is_corrupt() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&i64::MAX.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        assert!(from_bytes(FieldKind::Timestamp, &bytes).is_err());

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i64.to_be_bytes());
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());
        assert!(from_bytes(FieldKind::Timestamp, &bytes).is_err());
    }

    #[test]
    fn invalid_utf8_is_corrupt() {
        assert!(from_bytes(FieldKind::String, &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn empty_string_is_valid() {
        let bytes = to_bytes(&FieldValue::String(String::new()));
        assert!(bytes.is_empty());
        assert_eq!(
            from_bytes(FieldKind::String, &bytes).unwrap(),
            FieldValue::String(String::new())
        );
    }
}
