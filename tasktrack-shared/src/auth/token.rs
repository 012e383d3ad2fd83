/// Opaque access token generation and hashing
///
/// Tokens are random base62 strings handed to the client once at login. The
/// database only ever sees their SHA-256 digest, so a leaked `sessions` table
/// does not yield usable credentials.
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::token::{generate_access_token, hash_access_token};
///
/// let (token, hash) = generate_access_token();
/// assert_eq!(token.len(), 48);
/// assert_eq!(hash, hash_access_token(&token));
/// assert_eq!(hash.len(), 64);
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of a generated access token
pub const ACCESS_TOKEN_LENGTH: usize = 48;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new access token
///
/// # Returns
///
/// `(plaintext_token, sha256_hex_digest)`
pub fn generate_access_token() -> (String, String) {
    let mut rng = rand::thread_rng();

    let token: String = (0..ACCESS_TOKEN_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    let hash = hash_access_token(&token);

    (token, hash)
}

/// Hex-encoded SHA-256 digest of a token (64 characters)
pub fn hash_access_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_base62() {
        let (token, _) = generate_access_token();
        assert_eq!(token.len(), ACCESS_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let (a, hash_a) = generate_access_token();
        let (b, hash_b) = generate_access_token();
        assert_ne!(a, b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_hash_is_deterministic_hex() {
        let hash = hash_access_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash, hash_access_token("abc"));
    }
}
