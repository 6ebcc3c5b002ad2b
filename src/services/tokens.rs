//! Order access tokens
//!
//! Two independent random values are minted per order: a short public id
//! that may appear in URLs, and a long token secret that is the sole proof
//! of ownership. Knowing the public id must never be enough to read or
//! mutate an order.

use rand::RngCore;

/// Short customer-facing order number, 4 random bytes hex-encoded.
pub fn mint_public_id() -> String {
    random_hex(4)
}

/// Capability credential, 16 random bytes hex-encoded. Revealed exactly
/// once, in the create-order response; the server never re-issues it.
pub fn mint_token_secret() -> String {
    random_hex(16)
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Whole-string token comparison. A prefix or substring match must never
/// pass.
pub fn token_matches(supplied: &str, stored: &str) -> bool {
    if supplied.len() != stored.len() {
        return false;
    }
    supplied
        .bytes()
        .zip(stored.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_lengths() {
        assert_eq!(mint_public_id().len(), 8);
        assert_eq!(mint_token_secret().len(), 32);
    }

    #[test]
    fn test_tokens_are_hex() {
        assert!(mint_token_secret().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(mint_public_id().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_secrets_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(mint_token_secret()));
        }
    }

    #[test]
    fn test_token_matches_is_exact() {
        assert!(token_matches("abcd1234", "abcd1234"));
        assert!(!token_matches("abcd1234", "abcd12345"));
        assert!(!token_matches("abcd123", "abcd1234"));
        assert!(!token_matches("", "abcd1234"));
        assert!(token_matches("", ""));
    }
}
