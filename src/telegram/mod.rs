//! Telegram bot integration and handlers

pub mod admin;
pub mod bot;
pub mod callbacks;
pub mod format;
pub mod handlers;
pub mod notifications;

pub use teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use notifications::{Notifier, TelegramNotifier};
