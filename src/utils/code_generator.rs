//! Short code generation.
//!
//! Codes are drawn from `rand`'s thread-local generator, a ChaCha-based CSPRNG
//! seeded from the operating system. Each of the 8 symbols is sampled uniformly
//! from `[A-Za-z0-9]` (rejection sampling, no modulo bias), giving
//! 62^8 ≈ 2.18×10^14 possible codes, about 47.6 bits of entropy per code.

use crate::domain::schema::SHORT_CODE_LENGTH;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Generates a random 8-character alphanumeric short code.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 8);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_CODE_LENGTH)
        .map(char::from)
        .collect()
}
