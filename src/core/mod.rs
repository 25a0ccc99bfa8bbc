//! Core utilities, configuration, errors, and the webhook HTTP server

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod web_server;

// Re-exports for convenience
pub use auth::AdminPolicy;
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_configuration};
