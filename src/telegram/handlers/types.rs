//! Handler types, dependencies, and user registration helper

use std::sync::Arc;

use teloxide::types::User as TgUser;

use crate::core::error::AppResult;
use crate::orders::OrderLedger;
use crate::payments::PaymentGateway;
use crate::storage::db::{get_connection, DbPool};
use crate::storage::users::{self, User, UserProfile};
use crate::telegram::notifications::broadcast;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub ledger: Arc<OrderLedger>,
    pub gateway: Arc<dyn PaymentGateway>,
    /// Asset every invoice is issued in
    pub asset: String,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(ledger: Arc<OrderLedger>, gateway: Arc<dyn PaymentGateway>, asset: impl Into<String>) -> Self {
        Self {
            db_pool: Arc::clone(ledger.db_pool()),
            ledger,
            gateway,
            asset: asset.into(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ledger.admins().is_admin(user_id)
    }
}

/// User info taken from the Telegram sender
#[derive(Clone, Debug)]
pub struct UserInfo {
    pub telegram_id: i64,
    pub profile: UserProfile,
}

impl UserInfo {
    /// Extract user info from a Telegram user
    pub fn from_user(user: &TgUser) -> Self {
        Self {
            telegram_id: i64::try_from(user.id.0).unwrap_or(0),
            profile: UserProfile {
                username: user.username.clone(),
                first_name: Some(user.first_name.clone()),
                last_name: user.last_name.clone(),
            },
        }
    }
}

/// Ensures the sender is registered, creating the user on first contact.
///
/// Called explicitly at the start of every command and callback handler.
/// A newly created user triggers a background notice to the admins.
///
/// # Returns
/// The stored user and whether this call created it.
pub fn ensure_user_exists(deps: &HandlerDeps, info: &UserInfo, first_action: &str) -> AppResult<(User, bool)> {
    let (user, created) = {
        let conn = get_connection(&deps.db_pool)?;
        users::get_or_create_user(&conn, info.telegram_id, &info.profile)?
    };

    if created {
        let notifier = Arc::clone(deps.ledger.notifier());
        let admins: Vec<i64> = deps.ledger.admins().admin_ids().collect();
        let text = format!(
            "👤 New user: {} ({})\nID: {}\nFirst action: {}",
            if user.full_name.is_empty() { "-" } else { user.full_name.as_str() },
            user.username.as_deref().map(|u| format!("@{}", u)).unwrap_or_else(|| "no username".to_string()),
            user.telegram_id,
            first_action
        );
        tokio::spawn(async move {
            broadcast(notifier.as_ref(), admins, &text).await;
        });
    }

    Ok((user, created))
}
