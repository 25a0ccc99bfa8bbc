//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the payment and admin configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the shop configuration at application startup
///
/// Secrets are never printed, only whether they are present.
pub fn log_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🛒 Shop configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    log::info!("Database: {}", config::DATABASE_PATH.as_str());
    log::info!("Webhook port: {}", *config::web::PORT);

    match config::PUBLIC_BASE_URL.as_deref() {
        Some(url) => log::info!("✅ PUBLIC_BASE_URL: {}", url),
        None => log::warn!("⚠️  PUBLIC_BASE_URL not set - invoices will not carry a return link"),
    }

    if config::payments::API_KEY.is_empty() {
        log::error!("❌ CRYPTO_PAY_API_KEY not set - purchases will fail!");
    } else {
        log::info!(
            "✅ Crypto Pay: {} (asset {})",
            config::payments::API_URL.as_str(),
            config::payments::ASSET.as_str()
        );
    }

    if *config::payments::VERIFY_SIGNATURE {
        log::info!("✅ Webhook signature verification enabled");
    } else {
        log::warn!("⚠️  Webhook signature verification disabled (WEBHOOK_VERIFY_SIGNATURE=false)");
    }

    if config::admin::ADMIN_IDS.is_empty() {
        log::warn!("⚠️  ADMIN_IDS not set - admin commands are unavailable");
    } else {
        log::info!("✅ {} admin(s) configured", config::admin::ADMIN_IDS.len());
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
