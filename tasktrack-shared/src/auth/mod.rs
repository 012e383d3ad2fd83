/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Opaque access token generation and SHA-256 digests
/// - [`gate`]: Resolves an access token to the owning user, enforcing
///   activation, lockout and expiry
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::password::{hash_password, verify_password};
/// use tasktrack_shared::auth::token::generate_access_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (token, digest) = generate_access_token();
/// # Ok(())
/// # }
/// ```

pub mod gate;
pub mod password;
pub mod token;
