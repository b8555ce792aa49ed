//! Server state - shared handles of all services
//!
//! `ServerState` is cheap to clone (Arc and handle clones only) and is the
//! axum state of every route.

use std::path::Path;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{DbService, MettStore, seed};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    /// Storage facade - the single interface to all business operations
    pub store: MettStore,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Initialize the server state
    ///
    /// Opens the database under `work_dir`, seeds roles, the default admin
    /// and the bun catalog, and wires up the services.
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be opened or the seed configuration
    /// is invalid; there is nothing useful to do without storage.
    pub async fn initialize(config: &Config) -> Self {
        std::fs::create_dir_all(&config.work_dir).expect("Failed to create work directory");

        let db_path = Path::new(&config.work_dir).join("database");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        seed::seed(&db, config)
            .await
            .expect("Failed to seed database");

        let store = MettStore::new(db.clone(), config.mett.clone());
        let jwt_service = Arc::new(JwtService::default());

        Self {
            config: config.clone(),
            db,
            store,
            jwt_service,
        }
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
