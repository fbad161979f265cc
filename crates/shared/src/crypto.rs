//! One-time secrets for password reset links and email login codes.
//!
//! Only the SHA-256 digest of a secret is ever stored.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of digits in an email login code.
pub const OTP_DIGITS: usize = 6;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// 32 random bytes, hex encoded. Used as a password reset token.
pub fn generate_secure_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Zero-padded six digit login code.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:0width$}", code, width = OTP_DIGITS)
}
