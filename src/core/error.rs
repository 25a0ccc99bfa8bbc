use thiserror::Error;

/// Centralized error types for the application
///
/// Every fallible operation in the shop (storage, ledger, payment gateway,
/// notifications) reports through this enum. The four domain variants map
/// one-to-one onto the reply the user or the webhook caller receives:
///
/// - `NotFound` → "not found" message / HTTP 404
/// - `Validation` → rejection message / HTTP 500 for webhooks
/// - `Unauthorized` → denial message / HTTP 401
/// - `Upstream` → logged, never fatal to the enclosing request
///
/// # Example
///
/// ```no_run
/// use shopbot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Order, product or user lookup miss
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input (admin command arguments, webhook payload, amounts)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller lacks the capability for the requested action
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Payment gateway or notification channel failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// True for errors that come from outside the process (gateway, Telegram).
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::Upstream(_) | AppError::Telegram(_) | AppError::Http(_))
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = AppError::NotFound("order 42".to_string());
        assert_eq!(err.to_string(), "Not found: order 42");

        let err = AppError::Validation("amount must be positive".to_string());
        assert!(err.to_string().contains("amount must be positive"));
    }

    #[test]
    fn test_upstream_classification() {
        assert!(AppError::Upstream("gateway down".into()).is_upstream());
        assert!(!AppError::Unauthorized("nope".into()).is_upstream());
        assert!(!AppError::NotFound("x".into()).is_upstream());
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Json(_)));
    }
}
