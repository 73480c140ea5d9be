//! Password hashing (argon2, PHC string format)

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash password using argon2 with a random salt
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC hash
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(hash_pass: &str, password: &str) -> bool {
    match PasswordHash::new(hash_pass) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("tres-secret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "tres-secret"));
        assert!(!verify_password(&hash, "wrong"));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("not-a-hash", "anything"));
    }
}
