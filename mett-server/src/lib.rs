//! Mett Server - internal bun ordering and billing service
//!
//! # Module structure
//!
//! ```text
//! mett-server/src/
//! ├── core/          # Config, state, server
//! ├── auth/          # JWT authentication, role guard
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Storage layer (accounts, catalog, orders, purchases)
//! └── utils/         # Errors, logging, time helpers
//! ```
//!
//! The storage layer is the interesting part: it enforces the
//! single-active-order window, the charge/credit arithmetic against user
//! balances, and the purchase authorization workflow. Everything else is
//! thin HTTP glue around [`MettStore`].

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, ConfigError, Server, ServerState, setup_environment};
pub use db::MettStore;
pub use db::repository::{StoreError, StoreResult};
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
                _   _
 _ __ ___   ___| |_| |_
| '_ ` _ \ / _ \ __| __|
| | | | | |  __/ |_| |_
|_| |_| |_|\___|\__|\__|
    "#
    );
}
