use std::collections::HashMap;

use serde_json::{json, Value};

use crate::auth::{generate_jwt, token_ttl_seconds, Claims};
use crate::database::models::user::{User, UserResponse};
use crate::error::ApiError;

// Bcrypt ignores input past this length
const BCRYPT_MAX_BYTES: usize = 72;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    let bytes = password.as_bytes();
    let truncated = &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)];
    bcrypt::hash(truncated, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let bytes = password.as_bytes();
    let truncated = &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)];
    bcrypt::verify(truncated, hash).unwrap_or(false)
}

/// Shape-level email check; the unique index is the real duplicate guard
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if well_formed {
        Ok(())
    } else {
        let mut field_errors = HashMap::new();
        field_errors.insert("email".to_string(), "Invalid email format".to_string());
        Err(ApiError::validation_error("Validation failed", Some(field_errors)))
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= 8 {
        Ok(())
    } else {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "password".to_string(),
            "Password must be at least 8 characters".to_string(),
        );
        Err(ApiError::validation_error("Validation failed", Some(field_errors)))
    }
}

/// Token response body shared by register and login
pub fn token_payload(user: &User) -> Result<Value, ApiError> {
    let tier = user.effective_tier();
    let token = generate_jwt(Claims::new(
        user.id,
        user.email.clone(),
        tier.as_str().to_string(),
    ))?;

    Ok(json!({
        "token": token,
        "user": UserResponse::from(user),
        "expires_in": token_ttl_seconds(),
    }))
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn overlong_passwords_truncate_consistently() {
        let long: String = "x".repeat(100);
        let hash = hash_password(&long).unwrap();
        // Beyond 72 bytes the input no longer matters
        let same_prefix: String = "x".repeat(80);
        assert!(verify_password(&same_prefix, &hash));
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@.com").is_err());
        assert!(validate_email("user name@example.com").is_err());
    }

    #[test]
    fn password_length_validation() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("").is_err());
    }
}
