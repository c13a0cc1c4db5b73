use bcrypt::{hash, verify};

use crate::errors::{Error, Result};

// Minimum bcrypt cost keeps the test suite fast.
#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Password hashing and strength rules.
pub struct PasswordService;

impl PasswordService {
    pub fn hash_password(password: &str) -> Result<String> {
        hash(password, HASH_COST).map_err(|e| Error::Credential {
            message: format!("Failed to hash password: {e}"),
        })
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).map_err(|e| Error::Credential {
            message: format!("Failed to verify password: {e}"),
        })
    }

    pub fn validate_password_strength(password: &str) -> Result<()> {
        if password.chars().count() < 8 {
            return Err(Error::validation(
                "Password must be at least 8 characters long",
            ));
        }

        let has_letter = password.chars().any(char::is_alphabetic);
        let has_digit = password.chars().any(char::is_numeric);

        if !has_letter || !has_digit {
            return Err(Error::validation(
                "Password must contain at least one letter and one number",
            ));
        }

        Ok(())
    }
}
