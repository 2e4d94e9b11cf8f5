//! Random material for rooms and sessions.
//!
//! Room codes are short and human-shareable, so they draw from an uppercase
//! alphabet; the password and the session token carry the real entropy.
//!
//! # Security
//!
//! All draws come from `ring`'s `SystemRandom` (CSPRNG). Codes and passwords
//! are produced by reducing a random integer against a fixed alphabet; the
//! reduction keeps a uniform-enough distribution for lookup keys of this
//! size.

use ring::rand::{SecureRandom, SystemRandom};

use crate::error::CoreError;

/// Alphabet for room codes (digits + uppercase letters).
const ROOM_CODE_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of a generated room code.
pub const ROOM_CODE_LENGTH: usize = 6;

/// Random bytes drawn per room code (32 bits covers the 36^6 code space).
const ROOM_CODE_RANDOM_BYTES: usize = 4;

/// Alphabet for room passwords (digits + mixed-case letters).
const ROOM_PASSWORD_CHARS: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of a generated room password.
pub const ROOM_PASSWORD_LENGTH: usize = 8;

/// Random bytes drawn per room password (48 bits for 8 base62 digits).
const ROOM_PASSWORD_RANDOM_BYTES: usize = 6;

/// Session token entropy in bytes; tokens are hex-encoded on issue.
pub const SESSION_TOKEN_BYTES: usize = 16;

/// Generate a room code: 6 chars, digits and uppercase letters.
pub fn generate_room_code() -> Result<String, CoreError> {
    draw(ROOM_CODE_CHARS, ROOM_CODE_LENGTH, ROOM_CODE_RANDOM_BYTES)
}

/// Generate a room password: 8 chars, digits and mixed-case letters.
pub fn generate_room_password() -> Result<String, CoreError> {
    draw(
        ROOM_PASSWORD_CHARS,
        ROOM_PASSWORD_LENGTH,
        ROOM_PASSWORD_RANDOM_BYTES,
    )
}

/// Generate a session token: 16 random bytes, hex-encoded.
pub fn generate_session_token() -> Result<String, CoreError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];

    rng.fill(&mut bytes).map_err(|e| {
        tracing::error!(target: "rd.core.codes", error = %e, "Failed to generate random bytes for session token");
        CoreError::Storage("RNG failure".to_string())
    })?;

    Ok(hex::encode(bytes))
}

/// Draw `length` characters from `alphabet` using `random_bytes` bytes of
/// CSPRNG output.
fn draw(alphabet: &[u8], length: usize, random_bytes: usize) -> Result<String, CoreError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; random_bytes];

    rng.fill(&mut bytes).map_err(|e| {
        tracing::error!(target: "rd.core.codes", error = %e, "Failed to generate random bytes");
        CoreError::Storage("RNG failure".to_string())
    })?;

    // Convert bytes to a big integer (u128 holds up to 16 bytes)
    let mut value: u128 = 0;
    for &b in &bytes {
        value = (value << 8) | u128::from(b);
    }

    // Reduce against the alphabet, extracting digits from the
    // least-significant end
    let radix = alphabet.len() as u128;
    let mut out = Vec::with_capacity(length);
    for _ in 0..length {
        let idx = (value % radix) as usize;
        let ch = alphabet
            .get(idx)
            .ok_or_else(|| CoreError::Storage("alphabet index out of range".to_string()))?;
        out.push(*ch);
        value /= radix;
    }

    // Reverse to get most-significant digit first (consistent ordering)
    out.reverse();

    String::from_utf8(out)
        .map_err(|_| CoreError::Storage("generated code contained invalid UTF-8".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_room_code_length_and_alphabet() {
        let code = generate_room_code().unwrap();
        assert_eq!(code.len(), ROOM_CODE_LENGTH);
        assert!(code
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
    }

    #[test]
    fn test_room_password_length_and_alphabet() {
        let password = generate_room_password().unwrap();
        assert_eq!(password.len(), ROOM_PASSWORD_LENGTH);
        assert!(password.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_session_token_is_hex_of_expected_width() {
        let token = generate_session_token().unwrap();
        // Two hex chars per byte
        assert_eq!(token.len(), SESSION_TOKEN_BYTES * 2);
        assert!(hex::decode(&token).is_ok());
    }

    #[test]
    fn test_session_tokens_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(generate_session_token().unwrap()));
        }
    }

    #[test]
    fn test_room_codes_vary() {
        let mut seen = HashSet::new();
        for _ in 0..100 {
            seen.insert(generate_room_code().unwrap());
        }
        // 36^6 values; 100 draws colliding down to a handful would mean the
        // generator is broken
        assert!(seen.len() > 90);
    }
}
