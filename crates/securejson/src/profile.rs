//! Sample record used by the demo binary.

use std::net::IpAddr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use securejson::{ConvertError, ConverterBinding, FieldBinding, FieldKind, FieldSet, SecureRecord};

/// A user profile whose every property is PII.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub devices: Option<Vec<IpAddr>>,
}

impl SecureRecord for UserProfile {
    fn binding() -> &'static ConverterBinding {
        static BINDING: OnceLock<ConverterBinding> = OnceLock::new();
        BINDING.get_or_init(|| {
            ConverterBinding::new(
                "UserProfile",
                vec![
                    FieldBinding::sealed("a", FieldKind::String).required(),
                    FieldBinding::sealed("b", FieldKind::String).required(),
                    FieldBinding::sealed("c", FieldKind::Timestamp),
                    FieldBinding::sealed("d", FieldKind::AddressList),
                ],
            )
        })
    }

    fn to_fields(&self) -> FieldSet {
        let mut set = FieldSet::new();
        set.insert("a", self.name.as_str())
            .insert("b", self.email.as_str())
            .insert_opt("c", self.date_of_birth)
            .insert_opt("d", self.devices.clone());
        set
    }

    fn from_fields(mut fields: FieldSet) -> Result<Self, ConvertError> {
        Ok(Self {
            name: fields.require_string("a")?,
            email: fields.require_string("b")?,
            date_of_birth: fields.take_timestamp("c")?,
            devices: fields.take_addresses("d")?,
        })
    }
}
