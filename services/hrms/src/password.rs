//! Password hashing and verification

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};

use crate::error::{ServiceError, ServiceResult};

/// Argon2id hasher producing PHC strings with a random salt per password
#[derive(Clone, Default)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    /// Create a hasher with explicit Argon2 cost parameters
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password
    pub fn hash_password(&self, plain: &str) -> ServiceResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        self.argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Verify a plaintext password against a stored hash
    ///
    /// A hash that cannot be parsed counts as a failed verification. The
    /// parameters embedded in the stored hash are used, not `self.params`.
    pub fn verify_password(&self, plain: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2()
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::fast_passwords;

    #[test]
    fn test_hash_and_verify() {
        let passwords = fast_passwords();
        let hash = passwords.hash_password("s3cret!").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify_password("s3cret!", &hash));
        assert!(!passwords.verify_password("s3cret?", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let passwords = fast_passwords();
        let first = passwords.hash_password("repeat-me").unwrap();
        let second = passwords.hash_password("repeat-me").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_fails_verification() {
        let passwords = fast_passwords();
        assert!(!passwords.verify_password("anything", "not-a-phc-string"));
        assert!(!passwords.verify_password("anything", ""));
    }
}
