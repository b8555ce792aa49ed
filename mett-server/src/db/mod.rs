//! Database Module
//!
//! Owns the embedded SurrealDB handle: RocksDB-backed on disk at runtime,
//! in-memory in tests.

pub mod models;
pub mod repository;
pub mod seed;
pub mod store;

pub use store::MettStore;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "mett";
const DATABASE: &str = "main";

/// Database service, owns the embedded database handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select database: {e}")))?;

        tracing::info!("Database connection established (embedded, path={db_path})");
        Ok(Self { db })
    }

    /// Open a throwaway in-memory database (tests)
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select database: {e}")))?;
        Ok(Self { db })
    }
}
