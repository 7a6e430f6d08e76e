//! CSRF state and PKCE (RFC 7636) verifier/challenge generation.

use oauth2::{PkceCodeChallenge, PkceCodeVerifier};
use rand::rngs::OsRng;
use rand::RngCore;

/// Length of the hex-encoded CSRF state (32 random bytes).
pub const STATE_LEN: usize = 64;

/// Bounds on a code verifier from RFC 7636 §4.1.
pub const VERIFIER_MIN_LEN: usize = 43;
pub const VERIFIER_MAX_LEN: usize = 128;

/// 256 bits from the OS CSPRNG, hex-encoded.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A fresh 43-char base64url verifier carrying 256 bits of entropy.
pub fn generate_code_verifier() -> String {
    let (_challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    verifier.secret().clone()
}

/// `BASE64URL(SHA256(verifier))`, the `S256` challenge sent at authorization time.
pub fn derive_code_challenge(verifier: &str) -> String {
    let verifier = PkceCodeVerifier::new(verifier.to_string());
    PkceCodeChallenge::from_code_verifier_sha256(&verifier)
        .as_str()
        .to_string()
}

pub fn is_valid_state(state: &str) -> bool {
    state.len() == STATE_LEN
        && state
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

pub fn is_valid_code_verifier(verifier: &str) -> bool {
    (VERIFIER_MIN_LEN..=VERIFIER_MAX_LEN).contains(&verifier.len())
        && verifier
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
}
