//! JSON document encode/decode driven by a [`ConverterBinding`].
//!
//! Sealed fields become envelope strings; plain fields become native JSON
//! values (string, number, RFC 3339 string, array of address strings). Keys
//! that the binding does not name are ignored on read and never written.

use std::net::IpAddr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use super::{ConverterBinding, FieldBinding, FieldSet, Protection, SecureRecord};
use crate::convert::{self, ConvertError, FieldKind, FieldValue};
use crate::crypto::{CipherEngine, EnvelopeError};

/// Encode `fields` into a JSON object according to `binding`.
///
/// Absent optional values are omitted rather than written as `null`.
///
/// # Errors
///
/// - [`ConvertError::MissingField`] if a required value is absent.
/// - [`ConvertError::KindMismatch`] if a value disagrees with its declared kind.
/// - [`ConvertError::MalformedDocument`] if `fields` holds an alias the binding does not declare.
pub fn encode_fields(
    engine: &CipherEngine,
    binding: &ConverterBinding,
    fields: &FieldSet,
) -> Result<Map<String, Value>, ConvertError> {
    if let Some(unbound) = fields.aliases().find(|a| binding.field(a).is_none()) {
        return Err(ConvertError::MalformedDocument(format!(
            "`{unbound}` is not bound on {}",
            binding.record()
        )));
    }

    let mut doc = Map::new();
    for field in binding.fields() {
        let Some(value) = fields.get(&field.alias) else {
            if field.required {
                return Err(ConvertError::MissingField(field.alias.clone()));
            }
            continue;
        };
        let json = match field.protection {
            Protection::Sealed => Value::String(convert::seal(engine, binding.slot(field), value)?),
            Protection::Plain => plain_to_json(field, value)?,
        };
        doc.insert(field.alias.clone(), json);
    }
    Ok(doc)
}

/// Decode every bound field of the JSON object `doc`.
///
/// Aliases match exactly first, then ignoring ASCII case. A JSON `null` is
/// treated the same as an absent key. The first failing field aborts the
/// whole decode.
///
/// # Errors
///
/// - [`ConvertError::MalformedDocument`] if `doc` is not an object or a plain
///   field has the wrong JSON type.
/// - [`ConvertError::MissingField`] if a required field is absent.
/// - [`ConvertError::Envelope`] if a sealed field is not a string or not a valid envelope.
/// - [`ConvertError::Cipher`] / [`ConvertError::Corrupt`] from the converters.
pub fn decode_fields(
    engine: &CipherEngine,
    binding: &ConverterBinding,
    doc: &Value,
) -> Result<FieldSet, ConvertError> {
    let Value::Object(map) = doc else {
        return Err(ConvertError::MalformedDocument(
            "top-level value is not an object".into(),
        ));
    };

    let mut fields = FieldSet::new();
    for field in binding.fields() {
        let json = match lookup(map, &field.alias) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(ConvertError::MissingField(field.alias.clone()));
                }
                continue;
            }
            Some(json) => json,
        };
        let value = match field.protection {
            Protection::Sealed => {
                let Value::String(text) = json else {
                    return Err(ConvertError::Envelope {
                        field: field.alias.clone(),
                        source: EnvelopeError::Malformed("not a JSON string"),
                    });
                };
                convert::open(engine, binding.slot(field), text)?
            }
            Protection::Plain => plain_from_json(field, json)?,
        };
        fields.insert(field.alias.clone(), value);
    }
    debug!(record = binding.record(), fields = fields.len(), "document decoded");
    Ok(fields)
}

/// Encode `record` into a pretty-printed JSON document.
pub fn encode<R: SecureRecord>(engine: &CipherEngine, record: &R) -> Result<String, ConvertError> {
    let doc = encode_fields(engine, R::binding(), &record.to_fields())?;
    Ok(serde_json::to_string_pretty(&Value::Object(doc))?)
}

/// Decode a JSON document into `R`, returning the first error encountered.
///
/// Meant for trusted callers that want the error; untrusted input should
/// go through [`crate::gate::try_decode`].
pub fn decode<R: SecureRecord>(engine: &CipherEngine, raw: &str) -> Result<R, ConvertError> {
    let doc: Value = serde_json::from_str(raw)?;
    let fields = decode_fields(engine, R::binding(), &doc)?;
    R::from_fields(fields)
}

fn lookup<'a>(map: &'a Map<String, Value>, alias: &str) -> Option<&'a Value> {
    map.get(alias).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(alias))
            .map(|(_, value)| value)
    })
}

fn plain_to_json(field: &FieldBinding, value: &FieldValue) -> Result<Value, ConvertError> {
    if value.kind() != field.kind {
        return Err(ConvertError::KindMismatch {
            field: field.alias.clone(),
            expected: field.kind,
            found: value.kind(),
        });
    }
    Ok(match value {
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Integer(n) => Value::from(*n),
        FieldValue::Timestamp(ts) => Value::String(plain_timestamp(ts)),
        FieldValue::AddressList(list) => {
            Value::Array(list.iter().map(|a| Value::String(a.to_string())).collect())
        }
    })
}

fn plain_from_json(field: &FieldBinding, json: &Value) -> Result<FieldValue, ConvertError> {
    let wrong_type = || {
        ConvertError::MalformedDocument(format!(
            "`{}` is not a valid {}",
            field.alias, field.kind
        ))
    };
    match field.kind {
        FieldKind::String => json
            .as_str()
            .map(|s| FieldValue::String(s.to_owned()))
            .ok_or_else(wrong_type),
        FieldKind::Integer => json.as_i64().map(FieldValue::Integer).ok_or_else(wrong_type),
        FieldKind::Timestamp => json
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(FieldValue::timestamp)
            .ok_or_else(wrong_type),
        FieldKind::AddressList => {
            let items = json.as_array().ok_or_else(wrong_type)?;
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .and_then(|s| s.parse::<IpAddr>().ok())
                        .ok_or_else(wrong_type)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::AddressList)
        }
    }
}

fn plain_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
