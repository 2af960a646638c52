//! Text framing of a [`CipherEnvelope`].
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext || tag)>
//! ```
//!
//! The version prefix selects the cipher suite on decode. A prefix that looks
//! like a version but is not one this build knows is rejected with
//! [`EnvelopeError::UnknownVersion`]; it is never decoded with a guessed suite.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;

use super::cipher::{NONCE_LEN, TAG_LEN};

/// Separator between the three envelope parts.
pub const SEPARATOR: char = '.';

/// Format versions this build can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeVersion {
    /// AES-256-GCM-SIV, 96-bit nonce, 128-bit tag.
    V1,
}

impl EnvelopeVersion {
    pub fn prefix(&self) -> &'static str {
        match self {
            EnvelopeVersion::V1 => "v1",
        }
    }

    fn from_prefix(prefix: &str) -> Result<Self, EnvelopeError> {
        match prefix {
            "v1" => Ok(EnvelopeVersion::V1),
            other => {
                let digits = other.strip_prefix('v').unwrap_or("");
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    Err(EnvelopeError::UnknownVersion(other.to_owned()))
                } else {
                    Err(EnvelopeError::Malformed("missing version prefix"))
                }
            }
        }
    }
}

/// Errors from framing or parsing envelope text.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The text does not have the `<version>.<nonce>.<payload>` shape.
    #[error("malformed envelope: {0}")]
    Malformed(&'static str),

    /// Well-formed version tag that this build does not support.
    #[error("unknown envelope version: {0}")]
    UnknownVersion(String),
}

/// One encrypted field value.
///
/// Created per encryption call and consumed straight away by the field codec;
/// envelopes carry no identity of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    pub version: EnvelopeVersion,
    /// Random per-call nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext without the tag. Same length as the plaintext.
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl CipherEnvelope {
    /// Encode this envelope to its canonical string representation.
    pub fn frame(&self) -> String {
        let mut payload = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        payload.extend_from_slice(&self.ciphertext);
        payload.extend_from_slice(&self.tag);
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.version.prefix(),
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(payload),
        )
    }

    /// Parse envelope text back into a [`CipherEnvelope`].
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::UnknownVersion`] for a `v<digits>` prefix other than `v1`.
    /// - [`EnvelopeError::Malformed`] for anything else that does not match
    ///   the expected structure: wrong part count, invalid base64, a nonce of
    ///   the wrong length, or a payload shorter than the tag.
    pub fn parse(s: &str) -> Result<Self, EnvelopeError> {
        let parts: Vec<&str> = s.splitn(3, SEPARATOR).collect();
        let [prefix, nonce_part, payload_part] = parts[..] else {
            return Err(EnvelopeError::Malformed("expected three parts"));
        };
        let version = EnvelopeVersion::from_prefix(prefix)?;

        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(nonce_part)
            .map_err(|_| EnvelopeError::Malformed("nonce is not base64url"))?;
        let nonce: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| EnvelopeError::Malformed("nonce has the wrong length"))?;

        let mut payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| EnvelopeError::Malformed("payload is not base64url"))?;
        let Some(split_at) = payload.len().checked_sub(TAG_LEN) else {
            return Err(EnvelopeError::Malformed("payload is truncated"));
        };
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&payload[split_at..]);
        payload.truncate(split_at);

        Ok(Self {
            version,
            nonce,
            ciphertext: payload,
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CipherEnvelope {
        CipherEnvelope {
            version: EnvelopeVersion::V1,
            nonce: [1u8; NONCE_LEN],
            ciphertext: b"ciphertext".to_vec(),
            tag: [2u8; TAG_LEN],
        }
    }

    #[test]
    fn frame_has_three_parts_and_prefix() {
        let s = sample().frame();
        assert!(s.starts_with("v1."));
        assert_eq!(s.split('.').count(), 3);
        assert_eq!(CipherEnvelope::parse(&s).unwrap(), sample());
    }

    #[test]
    fn empty_ciphertext_is_present_not_absent() {
        let env = CipherEnvelope {
            ciphertext: Vec::new(),
            ..sample()
        };
        let parsed = CipherEnvelope::parse(&env.frame()).unwrap();
        assert!(parsed.ciphertext.is_empty());
        assert_eq!(parsed.tag, [2u8; TAG_LEN]);
    }

    #[test]
    fn rejects_unknown_version() {
        let s = sample().frame().replacen("v1", "v2", 1);
        assert!(matches!(
            CipherEnvelope::parse(&s),
            Err(EnvelopeError::UnknownVersion(v)) if v == "v2"
        ));
    }

    #[test]
    fn rejects_bad_prefix() {
        let s = sample().frame().replacen("v1", "x1", 1);
        assert!(matches!(CipherEnvelope::parse(&s), Err(EnvelopeError::Malformed(_))));
        let s = sample().frame().replacen("v1", "v", 1);
        assert!(matches!(CipherEnvelope::parse(&s), Err(EnvelopeError::Malformed(_))));
    }

    #[test]
    fn rejects_too_few_parts() {
        assert!(matches!(CipherEnvelope::parse("v1.abc"), Err(EnvelopeError::Malformed(_))));
        assert!(matches!(CipherEnvelope::parse(""), Err(EnvelopeError::Malformed(_))));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(
            CipherEnvelope::parse("v1.!!!.abc"),
            Err(EnvelopeError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_wrong_nonce_length() {
        let s = format!(
            "v1.{}.{}",
            URL_SAFE_NO_PAD.encode([0u8; 8]),
            URL_SAFE_NO_PAD.encode([0u8; TAG_LEN])
        );
        assert!(matches!(CipherEnvelope::parse(&s), Err(EnvelopeError::Malformed(_))));
    }

    #[test]
    fn rejects_truncated_payload() {
        let s = format!(
            "v1.{}.{}",
            URL_SAFE_NO_PAD.encode([0u8; NONCE_LEN]),
            URL_SAFE_NO_PAD.encode([0u8; TAG_LEN - 1])
        );
        assert!(matches!(CipherEnvelope::parse(&s), Err(EnvelopeError::Malformed(_))));
    }
}
