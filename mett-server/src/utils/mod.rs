//! Utility module - shared helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error type and result alias
//! - [`logger`] - tracing setup
//! - [`time`] - order window expiry arithmetic

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{AppError, AppResponse, ok, ok_with_message};
pub use result::AppResult;
