use bcrypt::{hash, verify, BcryptError};

// Matches the cost the existing user rows were hashed with.
pub const BCRYPT_COST: u32 = 10;

pub fn hash_password(plain: &str) -> Result<String, BcryptError> {
    hash(plain, BCRYPT_COST)
}

pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, BcryptError> {
    verify(plain, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hashed).unwrap());
        assert!(!verify_password("wrong-password", &hashed).unwrap());
    }
}
