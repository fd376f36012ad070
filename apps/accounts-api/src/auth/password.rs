//! Password hashing using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id
///
/// Returns the hash in PHC string format.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("Failed to hash password: {}", e))
}

/// Verify a password against a stored PHC-format hash
///
/// Returns `false` on mismatch or if the stored hash fails to parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Validate email format (basic validation)
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim().to_lowercase();

    if email.len() < 5 {
        return Err("Email is too short".to_string());
    }

    if !email.contains('@') {
        return Err("Email must contain @".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err("Please enter a valid email! e.g. mail@mail.com".to_string());
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err("Email local part cannot be empty".to_string());
    }

    if !domain.contains('.') {
        return Err("Email domain must contain a dot".to_string());
    }

    Ok(())
}
