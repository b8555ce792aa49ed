//! Repository Module
//!
//! One repository per table, all sharing a single embedded SurrealDB
//! handle. Mutations that touch more than one record run as a chained
//! `BEGIN TRANSACTION` .. `COMMIT TRANSACTION` query; invariant guards run
//! inside the transaction as `THROW` statements so the check and the write
//! cannot be separated.

pub mod account;
pub mod bun_class;
pub mod order;
pub mod purchase;
pub mod user;

pub use account::AccountRepository;
pub use bun_class::BunClassRepository;
pub use order::OrderRepository;
pub use purchase::PurchaseRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Order expired: {0}")]
    Expired(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Whether a create failed because the record id is already taken
pub(crate) fn is_already_exists(err: &surrealdb::Error) -> bool {
    err.to_string().contains("already exists")
}

/// Prefix the engine puts in front of THROW messages
const THROWN_MARKER: &str = "An error occurred:";

/// Check a chained transaction response.
///
/// When a guard THROW aborted the transaction, the other statements only
/// report the generic cancellation error; the guard's own statement carries
/// the thrown message. Every guard protects a uniqueness/single-resolution
/// invariant, so a thrown message maps to `Conflict`.
pub(crate) fn check_transaction(mut response: surrealdb::Response) -> StoreResult<()> {
    let errors = response.take_errors();
    if errors.is_empty() {
        return Ok(());
    }
    for error in errors.values() {
        let message = error.to_string();
        if let Some(thrown) = message.split(THROWN_MARKER).nth(1) {
            return Err(StoreError::Conflict(thrown.trim().to_string()));
        }
    }
    let first = errors
        .into_values()
        .next()
        .map(|error| error.to_string())
        .unwrap_or_default();
    Err(StoreError::Database(first))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
