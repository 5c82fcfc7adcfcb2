//! Stored credentials and password verification

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use gatehouse_types::{Identity, Role};
use rand::rngs::OsRng;

use crate::error::{GatehouseError, Result};

/// How the configured password is stored
#[derive(Clone)]
pub enum Secret {
    Plain(String),
    /// Argon2 hash in PHC string format
    Argon2(String),
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Plain(_) => write!(f, "Plain(***)"),
            Secret::Argon2(_) => write!(f, "Argon2(***)"),
        }
    }
}

/// The single credential an authenticating proxy accepts
#[derive(Debug, Clone)]
pub struct Credential {
    username: String,
    secret: Secret,
    role: Role,
}

impl Credential {
    pub fn plain(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            secret: Secret::Plain(password.into()),
            role,
        }
    }

    /// Build from an argon2 PHC string, rejecting malformed hashes up front
    pub fn hashed(username: impl Into<String>, hash: impl Into<String>, role: Role) -> Result<Self> {
        let hash = hash.into();
        PasswordHash::new(&hash)
            .map_err(|e| GatehouseError::Credential(format!("Invalid password hash: {}", e)))?;

        Ok(Self {
            username: username.into(),
            secret: Secret::Argon2(hash),
            role,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone(), self.role)
    }

    /// Check a username/password pair against this credential
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }

        match &self.secret {
            Secret::Plain(expected) => expected == password,
            Secret::Argon2(hash) => match PasswordHash::new(hash) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            },
        }
    }
}

/// Hash a password into an argon2 PHC string suitable for configuration
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GatehouseError::Credential(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_credential() {
        let credential = Credential::plain("admin", "secret123", Role::Admin);

        assert!(credential.verify("admin", "secret123"));
        assert!(!credential.verify("admin", "wrongpassword"));
        assert!(!credential.verify("Admin", "secret123"));
        assert_eq!(credential.identity(), Identity::new("admin", Role::Admin));
    }

    #[test]
    fn test_hashed_credential() {
        let hash = hash_password("user123").unwrap();
        assert!(hash.starts_with("$argon2"));

        let credential = Credential::hashed("user", hash, Role::User).unwrap();
        assert!(credential.verify("user", "user123"));
        assert!(!credential.verify("user", "user124"));
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        let err = Credential::hashed("user", "not-a-hash", Role::User).unwrap_err();
        assert!(matches!(err, GatehouseError::Credential(_)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let credential = Credential::plain("admin", "secret123", Role::Admin);
        assert!(!format!("{:?}", credential).contains("secret123"));
    }
}
