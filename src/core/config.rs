use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Database file path (storage connection string)
/// Read from DATABASE_PATH environment variable
/// Default: shop.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "shop.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: shopbot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "shopbot.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Public base URL the payment gateway calls back into
/// Read from PUBLIC_BASE_URL environment variable
/// Example: https://shop.example.com
pub static PUBLIC_BASE_URL: Lazy<Option<String>> = Lazy::new(|| {
    env::var("PUBLIC_BASE_URL").ok().and_then(|value| {
        let trimmed = value.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
});

/// Support contact shown by /contact
/// Read from SUPPORT_CONTACT environment variable
pub static SUPPORT_CONTACT: Lazy<String> =
    Lazy::new(|| env::var("SUPPORT_CONTACT").unwrap_or_else(|_| "@support".to_string()));

/// Webhook HTTP server configuration
pub mod web {
    use once_cell::sync::Lazy;
    use std::env;

    /// Port for the webhook HTTP server
    /// Read from WEB_PORT (or PORT) environment variable
    /// Default: 3000
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("WEB_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000)
    });
}

/// Crypto payment gateway configuration
pub mod payments {
    use once_cell::sync::Lazy;
    use std::env;

    /// Crypto Pay API token
    /// Read from CRYPTO_PAY_API_KEY environment variable
    pub static API_KEY: Lazy<String> = Lazy::new(|| env::var("CRYPTO_PAY_API_KEY").unwrap_or_else(|_| String::new()));

    /// Crypto Pay API base URL
    /// Read from CRYPTO_PAY_API_URL environment variable
    /// Default: https://pay.crypt.bot (use https://testnet-pay.crypt.bot for testnet)
    pub static API_URL: Lazy<String> = Lazy::new(|| {
        env::var("CRYPTO_PAY_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "https://pay.crypt.bot".to_string())
    });

    /// Asset every invoice is issued in
    /// Read from CRYPTO_PAY_ASSET environment variable
    /// Default: USDT
    pub static ASSET: Lazy<String> = Lazy::new(|| env::var("CRYPTO_PAY_ASSET").unwrap_or_else(|_| "USDT".to_string()));

    /// Require a valid `crypto-pay-api-signature` header on /crypto-webhook
    /// Read from WEBHOOK_VERIFY_SIGNATURE environment variable
    /// Default: false
    pub static VERIFY_SIGNATURE: Lazy<bool> = Lazy::new(|| {
        env::var("WEBHOOK_VERIFY_SIGNATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false)
    });
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub(crate) fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable, falling back to ADMIN_ID
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .or_else(|_| env::var("ADMIN_ID"))
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for outbound HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Dispatcher restart configuration
pub mod retry {
    use super::Duration;

    /// How many times the polling dispatcher is restarted after a panic
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Base for the exponential backoff between restarts (in seconds)
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Pause before a restarted dispatcher starts polling again
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(1)
    }
}

/// Catalog display configuration
pub mod catalog {
    /// Maximum number of products sent in reply to a single listing command
    pub const MAX_LISTED_PRODUCTS: usize = 20;

    /// Categories offered by /categories when the catalog is still empty
    pub const DEFAULT_CATEGORIES: [&str; 4] = ["Electronics", "Books", "Clothing", "Accessories"];
}

#[cfg(test)]
mod tests {
    use super::admin::parse_admin_ids;

    #[test]
    fn test_parse_admin_ids_mixed_separators() {
        assert_eq!(parse_admin_ids("1, 2,3\n4\t5"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parse_admin_ids_skips_garbage() {
        assert_eq!(parse_admin_ids("abc, 42, ,-7"), vec![42, -7]);
        assert!(parse_admin_ids("").is_empty());
    }
}
