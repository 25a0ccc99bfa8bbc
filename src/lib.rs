//! Shopbot - Telegram storefront bot with crypto payments
//!
//! This library provides the catalog, user directory, order ledger, payment
//! gateway adapter and Telegram bot integration for the shop.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, admin policy and the webhook server
//! - `storage`: SQLite pool, catalog, users and order rows
//! - `orders`: Order status machine, ledger, checkout and payment reconciliation
//! - `payments`: Crypto Pay invoice client and webhook signatures
//! - `telegram`: Telegram bot integration and handlers

pub mod cli;
pub mod core;
pub mod orders;
pub mod payments;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use orders::{OrderLedger, OrderStatus};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
