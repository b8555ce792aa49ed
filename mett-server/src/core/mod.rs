//! Core module - configuration, state and server lifecycle

pub mod config;
pub mod server;
pub mod state;

pub use config::{Config, ConfigError, MettConfig};
pub use server::Server;
pub use state::ServerState;

/// Set up the process environment: dotenv and logging.
///
/// Must be called once, before anything logs.
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    crate::utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
