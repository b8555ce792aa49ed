//! User and Role Models
//!
//! Authentication data, separate from the ledger account of the same name.
//! Roles are plain names ("admin", "user") attached to the user record.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// User model (record key is the user name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Role model (record key is the role name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
}

/// Create user payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub password: String,
}

impl User {
    /// Verify a password against the stored argon2 hash
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}
