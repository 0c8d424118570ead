//! Short hash generation and uniqueness checks.
//!
//! Hashes are 12 symbols drawn uniformly from a 62-symbol alphabet
//! (`0-9`, `A-Z`, `a-z`) using the operating system CSPRNG.

use std::future::Future;

use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};

use crate::error::AppError;

/// Number of symbols in a generated hash.
pub const HASH_LENGTH: usize = 12;

/// Alphabet used for generated hashes.
pub const HASH_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generates a random 12-character hash.
///
/// # Panics
///
/// Panics if the system random number generator fails. A broken entropy
/// source is not something the service can recover from.
pub fn generate_hash() -> String {
    let mut rng = OsRng.unwrap_err();

    (0..HASH_LENGTH)
        .map(|_| HASH_ALPHABET[rng.random_range(0..HASH_ALPHABET.len())] as char)
        .collect()
}

/// Returns `true` if `hash` has the generated shape (length and alphabet).
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == HASH_LENGTH && hash.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Generates hashes until `exists` reports one as unused.
///
/// There is no attempt limit: with 62^12 possible values a collision is
/// already rare, so a long streak means the existence check is misbehaving.
/// Every collision yields to the scheduler and streaks are logged at
/// power-of-two attempt counts.
///
/// # Errors
///
/// Returns the first error produced by `exists`. Store failures are not
/// retried here.
pub async fn ensure_unique_hash<F, Fut>(mut exists: F) -> Result<String, AppError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, AppError>>,
{
    let mut attempts: u64 = 0;

    loop {
        let candidate = generate_hash();
        attempts += 1;

        if !exists(candidate.clone()).await? {
            if attempts > 1 {
                tracing::debug!(attempts, "Found unused hash after collisions");
            }
            return Ok(candidate);
        }

        if attempts.is_power_of_two() && attempts >= 4 {
            tracing::warn!(attempts, "Repeated hash collisions; check the link store");
        }

        tokio::task::yield_now().await;
    }
}
