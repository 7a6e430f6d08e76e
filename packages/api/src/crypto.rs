//! # Authenticated envelope — AES-256-GCM sealed cookie payloads
//!
//! Both browser cookies the server issues (the short-lived `oauth_state` and the
//! long-lived `session`) carry a structured payload that must be unreadable and
//! unforgeable by the client. This module turns any serde-serializable value into
//! a compact, cookie-safe token and back.
//!
//! ## Session key
//!
//! [`SessionKey`] holds the 32-byte symmetric key. It is parsed once at startup
//! from the 64-hex-char `SESSION_SECRET` setting by [`SessionKey::from_hex`]; a
//! missing, non-hex or wrong-length secret is an [`AuthError::Configuration`].
//! Per-token uniqueness comes from a fresh 96-bit nonce drawn from the OS CSPRNG
//! on every [`seal`] call, so nonces are never reused under one key.
//!
//! ## Wire format
//!
//! ```text
//! base64url(nonce) "." base64url(tag) "." base64url(ciphertext)
//! ```
//!
//! All three segments are unpadded base64url, so `.` never appears inside one.
//! The plaintext is JSON `{"kind": ..., "data": ...}`; `kind` is a schema tag
//! that keeps an `oauth_state` token from ever being accepted as a `session`.
//!
//! ## Public API
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`seal`] | Serializes `data` under `kind`, encrypts it with a fresh nonce and emits the three-segment token. |
//! | [`open`] | Splits, decodes, authenticates and decrypts a token, then checks `kind` and deserializes `data`. Fails closed with [`AuthError::MalformedEnvelope`], [`AuthError::Integrity`] or [`AuthError::Schema`]. |

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const SEPARATOR: &str = ".";

/// The process-wide 256-bit envelope key.
#[derive(Clone)]
pub struct SessionKey([u8; KEY_LEN]);

impl SessionKey {
    /// Parse a 64 hex-char secret into a key.
    pub fn from_hex(hex_key: &str) -> Result<Self, AuthError> {
        let hex_key = hex_key.trim();
        if hex_key.is_empty() {
            return Err(AuthError::config("SESSION_SECRET is required"));
        }
        let bytes = hex::decode(hex_key)
            .map_err(|e| AuthError::config(format!("SESSION_SECRET is not valid hex: {e}")))?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            AuthError::config(format!(
                "SESSION_SECRET must be 64 hex chars (32 bytes), got {} bytes",
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// A fresh random key. Handy for tests and for generating a `SESSION_SECRET`.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(&self.0.into())
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

#[derive(Serialize)]
struct SealedRef<'a, T> {
    kind: &'a str,
    data: &'a T,
}

#[derive(Deserialize)]
struct Sealed {
    kind: String,
    data: serde_json::Value,
}

/// Encrypt `data` tagged as `kind` into a `nonce.tag.ciphertext` token.
pub fn seal<T: Serialize>(key: &SessionKey, kind: &str, data: &T) -> Result<String, AuthError> {
    let plaintext =
        serde_json::to_vec(&SealedRef { kind, data }).map_err(|_| AuthError::Schema)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the 16-byte tag to the ciphertext
    let mut ciphertext = key
        .cipher()
        .encrypt(nonce, plaintext.as_slice())
        .map_err(|_| AuthError::Integrity)?;
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

    Ok([
        URL_SAFE_NO_PAD.encode(nonce_bytes),
        URL_SAFE_NO_PAD.encode(tag),
        URL_SAFE_NO_PAD.encode(ciphertext),
    ]
    .join(SEPARATOR))
}

/// Authenticate and decrypt a token produced by [`seal`], expecting payload `kind`.
pub fn open<T: DeserializeOwned>(
    key: &SessionKey,
    kind: &str,
    token: &str,
) -> Result<T, AuthError> {
    let mut segments = token.split(SEPARATOR);
    let (Some(nonce_b64), Some(tag_b64), Some(ct_b64), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedEnvelope);
    };
    if nonce_b64.is_empty() || tag_b64.is_empty() || ct_b64.is_empty() {
        return Err(AuthError::MalformedEnvelope);
    }

    // Past this point the token has the right shape, so any bad byte is tampering
    let nonce_bytes = decode_segment(nonce_b64)?;
    let tag = decode_segment(tag_b64)?;
    let mut combined = decode_segment(ct_b64)?;
    if nonce_bytes.len() != NONCE_LEN || tag.len() != TAG_LEN {
        return Err(AuthError::Integrity);
    }
    combined.extend_from_slice(&tag);

    let plaintext = key
        .cipher()
        .decrypt(Nonce::from_slice(&nonce_bytes), combined.as_slice())
        .map_err(|_| AuthError::Integrity)?;

    let sealed: Sealed = serde_json::from_slice(&plaintext).map_err(|_| AuthError::Schema)?;
    if sealed.kind != kind {
        return Err(AuthError::Schema);
    }
    serde_json::from_value(sealed.data).map_err(|_| AuthError::Schema)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Integrity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    fn payload() -> Payload {
        Payload {
            name: "ada".to_string(),
            count: 7,
        }
    }

    /// Re-encode a token after flipping one bit of the decoded segment `idx`.
    fn flip_bit(token: &str, idx: usize, bit: usize) -> String {
        let mut parts: Vec<Vec<u8>> = token
            .split(SEPARATOR)
            .map(|s| URL_SAFE_NO_PAD.decode(s).unwrap())
            .collect();
        let seg = &mut parts[idx];
        seg[bit / 8] ^= 1 << (bit % 8);
        parts
            .iter()
            .map(|p| URL_SAFE_NO_PAD.encode(p))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &payload()).unwrap();
        let back: Payload = open(&key, "test", &token).unwrap();
        assert_eq!(back, payload());
    }

    #[test]
    fn test_token_shape() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &payload()).unwrap();
        let parts: Vec<&str> = token.split(SEPARATOR).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(URL_SAFE_NO_PAD.decode(parts[0]).unwrap().len(), NONCE_LEN);
        assert_eq!(URL_SAFE_NO_PAD.decode(parts[1]).unwrap().len(), TAG_LEN);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'));
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let key = SessionKey::generate();
        let a = seal(&key, "test", &payload()).unwrap();
        let b = seal(&key, "test", &payload()).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.split(SEPARATOR).next(), b.split(SEPARATOR).next());
    }

    #[test]
    fn test_wrong_key_fails_integrity() {
        let token = seal(&SessionKey::generate(), "test", &payload()).unwrap();
        let err = open::<Payload>(&SessionKey::generate(), "test", &token).unwrap_err();
        assert!(matches!(err, AuthError::Integrity));
    }

    #[test]
    fn test_every_ciphertext_bit_flip_is_detected() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &payload()).unwrap();
        let ct_len = URL_SAFE_NO_PAD
            .decode(token.split(SEPARATOR).nth(2).unwrap())
            .unwrap()
            .len();
        for bit in 0..ct_len * 8 {
            let tampered = flip_bit(&token, 2, bit);
            let err = open::<Payload>(&key, "test", &tampered).unwrap_err();
            assert!(matches!(err, AuthError::Integrity), "bit {bit} not detected");
        }
    }

    #[test]
    fn test_nonce_and_tag_bit_flips_are_detected() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &payload()).unwrap();
        for bit in 0..NONCE_LEN * 8 {
            let err = open::<Payload>(&key, "test", &flip_bit(&token, 0, bit)).unwrap_err();
            assert!(matches!(err, AuthError::Integrity));
        }
        for bit in 0..TAG_LEN * 8 {
            let err = open::<Payload>(&key, "test", &flip_bit(&token, 1, bit)).unwrap_err();
            assert!(matches!(err, AuthError::Integrity));
        }
    }

    #[test]
    fn test_missing_segments_are_malformed() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &payload()).unwrap();
        let parts: Vec<&str> = token.split(SEPARATOR).collect();

        for bad in [
            String::new(),
            parts[0].to_string(),
            format!("{}.{}", parts[0], parts[1]),
            format!("{}..{}", parts[0], parts[2]),
            format!(".{}.{}", parts[1], parts[2]),
            format!("{token}.extra"),
        ] {
            let err = open::<Payload>(&key, "test", &bad).unwrap_err();
            assert!(matches!(err, AuthError::MalformedEnvelope), "{bad:?}");
        }
    }

    #[test]
    fn test_undecodable_segment_fails_integrity() {
        let key = SessionKey::generate();
        let err = open::<Payload>(&key, "test", "!!!.???.***").unwrap_err();
        assert!(matches!(err, AuthError::Integrity));
    }

    #[test]
    fn test_every_token_text_bit_flip_is_rejected() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &payload()).unwrap();
        let original = token.as_bytes();

        for pos in 0..original.len() {
            // Bit 7 would leave ASCII and is not a valid single-byte char
            for bit in 0..7 {
                let mut bytes = original.to_vec();
                bytes[pos] ^= 1 << bit;
                let tampered = String::from_utf8(bytes).unwrap();
                let err = open::<Payload>(&key, "test", &tampered).unwrap_err();

                let reshaped = original[pos] == b'.' || tampered.as_bytes()[pos] == b'.';
                if reshaped {
                    assert!(
                        matches!(err, AuthError::MalformedEnvelope | AuthError::Integrity),
                        "byte {pos} bit {bit}: {err:?}"
                    );
                } else {
                    assert!(
                        matches!(err, AuthError::Integrity),
                        "byte {pos} bit {bit}: {err:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_wrong_nonce_length_fails_integrity() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &payload()).unwrap();
        let rest: Vec<&str> = token.split(SEPARATOR).skip(1).collect();
        let short_nonce = URL_SAFE_NO_PAD.encode([0u8; 8]);
        let bad = format!("{short_nonce}.{}.{}", rest[0], rest[1]);
        let err = open::<Payload>(&key, "test", &bad).unwrap_err();
        assert!(matches!(err, AuthError::Integrity));
    }

    #[test]
    fn test_kind_mismatch_is_schema_error() {
        let key = SessionKey::generate();
        let token = seal(&key, "oauth_state", &payload()).unwrap();
        let err = open::<Payload>(&key, "session", &token).unwrap_err();
        assert!(matches!(err, AuthError::Schema));
    }

    #[test]
    fn test_shape_mismatch_is_schema_error() {
        let key = SessionKey::generate();
        let token = seal(&key, "test", &vec![1, 2, 3]).unwrap();
        let err = open::<Payload>(&key, "test", &token).unwrap_err();
        assert!(matches!(err, AuthError::Schema));
    }

    #[test]
    fn test_key_from_hex() {
        let hex_key = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
        let key = SessionKey::from_hex(hex_key).unwrap();
        let token = seal(&key, "test", &payload()).unwrap();
        let same = SessionKey::from_hex(hex_key).unwrap();
        assert_eq!(open::<Payload>(&same, "test", &token).unwrap(), payload());
    }

    #[test]
    fn test_key_from_hex_rejects_bad_secrets() {
        let too_long = "ab".repeat(33);
        for bad in ["", "   ", "not-hex", "00ff", too_long.as_str()] {
            let err = SessionKey::from_hex(bad).unwrap_err();
            assert!(matches!(err, AuthError::Configuration(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = SessionKey::from_bytes([0xab; 32]);
        assert_eq!(format!("{key:?}"), "SessionKey(..)");
    }
}
