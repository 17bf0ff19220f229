use argon2::Argon2;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> [u8; 32] {
    rand::thread_rng().gen()
}

/// Hash a password with Argon2id using the provided salt
pub fn hash_password(password: &str, salt: &[u8]) -> Result<[u8; 32], AppError> {
    let argon2 = Argon2::default();
    let mut hash = [0u8; 32];

    argon2
        .hash_password_into(password.as_bytes(), salt, &mut hash)
        .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))?;

    Ok(hash)
}

/// Verify a password against a stored hash and salt
pub fn verify_password(password: &str, stored_hash: &[u8], salt: &[u8]) -> Result<bool, AppError> {
    let computed_hash = hash_password(password, salt)?;
    Ok(computed_hash.as_slice() == stored_hash)
}

/// Unsalted SHA-256 fingerprint of a password, hex encoded.
///
/// Accounts are keyed by this value, so it must stay deterministic.
/// It is never used to prove knowledge of the password; `verify_password` does that.
pub fn password_signature(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify() {
        let password = "test_password_123";
        let salt = generate_salt();

        let hash = hash_password(password, &salt).unwrap();
        assert!(verify_password(password, &hash, &salt).unwrap());
        assert!(!verify_password("wrong_password", &hash, &salt).unwrap());
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("abcd", &generate_salt()).unwrap();
        let b = hash_password("abcd", &generate_salt()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let sig = password_signature("abcd");
        assert_eq!(sig, password_signature("abcd"));
        assert_ne!(sig, password_signature("abcde"));
        assert_eq!(sig.len(), 64);
        assert_eq!(
            sig,
            "88d4266fd4e6338d13b845fcf289579d209c897823b9217da3e161936f031589"
        );
    }
}
