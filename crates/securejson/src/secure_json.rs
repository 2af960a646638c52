//! [`SecureJson`]: the configured entry point used by application code.

use std::sync::Arc;

use common::ValidationResult;
use tracing::info;

use crate::convert::ConvertError;
use crate::crypto::{CipherEngine, KdfParams, KeyMaterial, Salt};
use crate::gate;
use crate::registry::{self, Registry};
use crate::schema::{document, SecureRecord};

/// Secret input for [`SecureJson::configure`].
pub enum Secret<'a> {
    /// Human-chosen password, stretched with Argon2id.
    Password(&'a str),
    /// Exactly 32 key bytes, used as-is.
    RawKey(&'a [u8]),
}

impl std::fmt::Debug for Secret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Password(_) => f.write_str("Secret::Password([REDACTED])"),
            Secret::RawKey(_) => f.write_str("Secret::RawKey([REDACTED])"),
        }
    }
}

/// Encodes records into protected documents and decodes them back.
///
/// Cheap to clone; all clones share one [`CipherEngine`].
#[derive(Clone, Debug)]
pub struct SecureJson {
    engine: Arc<CipherEngine>,
}

impl SecureJson {
    /// Build key material from `secret` and wrap it in a ready engine.
    ///
    /// Configure once per process and keep the result; key derivation is
    /// deliberately slow. Configuring again with a different secret produces
    /// an engine that rejects every document written under the old one.
    ///
    /// `salt` and `params` are ignored for [`Secret::RawKey`].
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Kdf`] for an empty password, a raw key of the
    /// wrong length, or invalid cost parameters.
    pub fn configure(
        secret: Secret<'_>,
        salt: &Salt,
        params: KdfParams,
    ) -> Result<Self, ConvertError> {
        let key = match secret {
            Secret::Password(password) => KeyMaterial::derive(password, salt, params)?,
            Secret::RawKey(bytes) => KeyMaterial::from_raw_key(bytes)?,
        };
        info!(algorithm = ?key.algorithm(), "field encryption configured");
        Ok(Self::from_engine(CipherEngine::new(key)))
    }

    pub fn from_engine(engine: CipherEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Resolve the engine registered under [`registry::CIPHER_ENGINE`].
    pub fn from_registry(registry: &Registry) -> Option<Self> {
        registry.cipher_engine().map(|engine| Self { engine })
    }

    /// Register this instance's engine under [`registry::CIPHER_ENGINE`].
    ///
    /// Returns `true` if an earlier engine was replaced.
    pub fn register(&self, registry: &Registry) -> bool {
        registry.register(registry::CIPHER_ENGINE, CipherEngine::clone(&self.engine))
    }

    pub fn engine(&self) -> &CipherEngine {
        &self.engine
    }

    /// Encode `record` into a pretty-printed JSON document with its sealed
    /// fields encrypted.
    pub fn encode<R: SecureRecord>(&self, record: &R) -> Result<String, ConvertError> {
        document::encode(&self.engine, record)
    }

    /// Decode a document from a trusted source, surfacing the exact error.
    pub fn decode<R: SecureRecord>(&self, raw: &str) -> Result<R, ConvertError> {
        document::decode(&self.engine, raw)
    }

    /// Decode a document from an untrusted source. Never returns an error;
    /// see [`gate::try_decode`].
    pub fn try_decode<R: SecureRecord>(&self, raw: &str) -> ValidationResult<R> {
        gate::try_decode(&self.engine, raw)
    }
}

/// `str` extension for validating protected documents in place.
pub trait SecureJsonExt {
    /// Decode `self` as a protected `R` document with `codec`.
    ///
    /// Returns `Some(record)` only when every field authenticated and parsed.
    fn is_valid_secure_json<R: SecureRecord>(&self, codec: &SecureJson) -> Option<R>;
}

impl SecureJsonExt for str {
    fn is_valid_secure_json<R: SecureRecord>(&self, codec: &SecureJson) -> Option<R> {
        codec.try_decode(self).into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::FieldKind;
    use crate::crypto::KEY_LEN;
    use crate::schema::{ConverterBinding, FieldBinding, FieldSet};
    use chrono::{DateTime, TimeZone, Utc};
    use common::FailureReason;
    use std::sync::OnceLock;

    #[derive(Debug, Clone, PartialEq)]
    struct Visit {
        at: DateTime<Utc>,
        note: Option<String>,
    }

    impl SecureRecord for Visit {
        fn binding() -> &'static ConverterBinding {
            static BINDING: OnceLock<ConverterBinding> = OnceLock::new();
            BINDING.get_or_init(|| {
                ConverterBinding::new(
                    "Visit",
                    vec![
                        FieldBinding::sealed("t", FieldKind::Timestamp).required(),
                        FieldBinding::sealed("n", FieldKind::String),
                    ],
                )
            })
        }

        fn to_fields(&self) -> FieldSet {
            let mut set = FieldSet::new();
            set.insert("t", self.at).insert_opt("n", self.note.clone());
            set
        }

        fn from_fields(mut fields: FieldSet) -> Result<Self, ConvertError> {
            Ok(Self {
                at: fields.require_timestamp("t")?,
                note: fields.take_string("n")?,
            })
        }
    }

    fn visit() -> Visit {
        Visit {
            at: Utc.with_ymd_and_hms(2024, 2, 22, 12, 0, 0).unwrap(),
            note: None,
        }
    }

    fn salt() -> Salt {
        Salt::from_bytes(vec![3u8; 16]).unwrap()
    }

    #[test]
    fn password_configuration_round_trip() {
        let codec =
            SecureJson::configure(Secret::Password("pw"), &salt(), KdfParams::insecure_fast())
                .unwrap();
        let raw = codec.encode(&visit()).unwrap();
        assert!(!raw.contains("\"n\""));
        assert_eq!(codec.decode::<Visit>(&raw).unwrap(), visit());
        assert_eq!(raw.as_str().is_valid_secure_json::<Visit>(&codec), Some(visit()));
    }

    #[test]
    fn reconfiguring_with_other_password_rejects_old_documents() {
        let first =
            SecureJson::configure(Secret::Password("pw"), &salt(), KdfParams::insecure_fast())
                .unwrap();
        let raw = first.encode(&visit()).unwrap();
        let second =
            SecureJson::configure(Secret::Password("other"), &salt(), KdfParams::insecure_fast())
                .unwrap();
        let result = second.try_decode::<Visit>(&raw);
        assert_eq!(result.failure_reason(), Some(FailureReason::AuthenticationFailed));
        assert!(second.decode::<Visit>(&raw).is_err());
    }

    #[test]
    fn empty_password_rejected() {
        let err = SecureJson::configure(Secret::Password(""), &salt(), KdfParams::insecure_fast())
            .unwrap_err();
        assert_eq!(err.reason(), FailureReason::WeakInput);
    }

    #[test]
    fn raw_key_configuration() {
        let codec = SecureJson::configure(
            Secret::RawKey(&[8u8; KEY_LEN]),
            &salt(),
            KdfParams::default(),
        )
        .unwrap();
        let raw = codec.encode(&visit()).unwrap();
        assert!(codec.try_decode::<Visit>(&raw).success());
        assert!(SecureJson::configure(Secret::RawKey(&[8u8; 4]), &salt(), KdfParams::default())
            .is_err());
    }

    #[test]
    fn registry_hands_out_same_engine() {
        let registry = Registry::new();
        assert!(SecureJson::from_registry(&registry).is_none());

        let codec = SecureJson::configure(
            Secret::RawKey(&[8u8; KEY_LEN]),
            &salt(),
            KdfParams::default(),
        )
        .unwrap();
        assert!(!codec.register(&registry));
        let resolved = SecureJson::from_registry(&registry).unwrap();
        let raw = codec.encode(&visit()).unwrap();
        assert_eq!(resolved.try_decode::<Visit>(&raw).into_value(), Some(visit()));
    }

    #[test]
    fn secret_debug_is_redacted() {
        assert!(!format!("{:?}", Secret::Password("hunter2")).contains("hunter2"));
    }
}
