//! User Repository (Authentication Store)
//!
//! Users and roles back the login flow and the admin identity checks of
//! the ledger and purchase workflow. Kept separate from the ledger account
//! of the same name.

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, StoreError, StoreResult, is_already_exists};
use crate::db::models::{Role, User};

const USER_TABLE: &str = "user";
const ROLE_TABLE: &str = "role";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a user with an argon2-hashed password and no roles
    pub async fn create_user(&self, name: &str, password: &str) -> StoreResult<User> {
        if !password_is_legal(password) {
            return Err(StoreError::Validation("Password is not legal".to_string()));
        }

        let password_hash = User::hash_password(password)
            .map_err(|e| StoreError::Database(format!("Failed to hash password: {}", e)))?;

        // password_hash never serializes, so the record is written with an
        // explicit CREATE instead of .content()
        let mut result = self
            .base
            .db()
            .query("CREATE $user SET name = $name, password_hash = $hash, roles = []")
            .bind(("user", RecordId::from_table_key(USER_TABLE, name)))
            .bind(("name", name.to_string()))
            .bind(("hash", password_hash))
            .await?;
        let created: Option<User> = result.take(0).map_err(|e| {
            if is_already_exists(&e) {
                StoreError::Conflict(format!("User '{}' already exists", name))
            } else {
                StoreError::from(e)
            }
        })?;
        created.ok_or_else(|| StoreError::Database("Failed to create user".to_string()))
    }

    pub async fn user_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.get_user(name).await?.is_some())
    }

    pub async fn get_user(&self, name: &str) -> StoreResult<Option<User>> {
        let user: Option<User> = self.base.db().select((USER_TABLE, name)).await?;
        Ok(user)
    }

    pub async fn delete_user(&self, name: &str) -> StoreResult<()> {
        let deleted: Option<User> = self.base.db().delete((USER_TABLE, name)).await?;
        if deleted.is_none() {
            return Err(StoreError::NotFound(format!("User '{}' not found", name)));
        }
        Ok(())
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY name")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Check a password against the stored hash
    pub async fn password_is_correct(&self, name: &str, password: &str) -> StoreResult<bool> {
        let user = self
            .get_user(name)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User '{}' not found", name)))?;
        user.verify_password(password)
            .map_err(|e| StoreError::Database(format!("Password verification failed: {}", e)))
    }

    pub async fn change_password(&self, name: &str, password: &str) -> StoreResult<()> {
        if !password_is_legal(password) {
            return Err(StoreError::Validation("Password is not legal".to_string()));
        }
        let password_hash = User::hash_password(password)
            .map_err(|e| StoreError::Database(format!("Failed to hash password: {}", e)))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET password_hash = $hash RETURN AFTER")
            .bind(("user", RecordId::from_table_key(USER_TABLE, name)))
            .bind(("hash", password_hash))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("User '{}' not found", name)))
    }

    pub async fn create_role(&self, name: &str) -> StoreResult<Role> {
        let created: Option<Role> = self
            .base
            .db()
            .create((ROLE_TABLE, name))
            .content(Role {
                id: None,
                name: name.to_string(),
            })
            .await
            .map_err(|e| {
                if is_already_exists(&e) {
                    StoreError::Conflict(format!("Role '{}' already exists", name))
                } else {
                    e.into()
                }
            })?;
        created.ok_or_else(|| StoreError::Database("Failed to create role".to_string()))
    }

    pub async fn role_exists(&self, name: &str) -> StoreResult<bool> {
        let role: Option<Role> = self.base.db().select((ROLE_TABLE, name)).await?;
        Ok(role.is_some())
    }

    /// Grant a role; adding the same role twice is a no-op
    pub async fn add_role_to_user(&self, user: &str, role: &str) -> StoreResult<()> {
        if !self.role_exists(role).await? {
            return Err(StoreError::NotFound(format!("Role '{}' not found", role)));
        }

        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET roles = array::union(roles, [$role]) RETURN AFTER")
            .bind(("user", RecordId::from_table_key(USER_TABLE, user)))
            .bind(("role", role.to_string()))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("User '{}' not found", user)))
    }

    pub async fn remove_role_from_user(&self, user: &str, role: &str) -> StoreResult<()> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET roles -= $role RETURN AFTER")
            .bind(("user", RecordId::from_table_key(USER_TABLE, user)))
            .bind(("role", role.to_string()))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("User '{}' not found", user)))
    }
}

/// Minimal password policy: non-empty, printable, bounded length
fn password_is_legal(password: &str) -> bool {
    !password.is_empty() && password.len() <= 72 && !password.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_legality() {
        assert!(password_is_legal("hunter2"));
        assert!(!password_is_legal(""));
        assert!(!password_is_legal("with\nnewline"));
        assert!(!password_is_legal(&"x".repeat(73)));
    }
}
