//! Admin capability check

use std::collections::HashSet;

use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Set of Telegram ids allowed to run admin actions.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    admins: HashSet<i64>,
}

impl AdminPolicy {
    pub fn new(admins: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admins: admins.into_iter().filter(|id| *id != 0).collect(),
        }
    }

    /// Policy from ADMIN_IDS / ADMIN_ID.
    pub fn from_env() -> Self {
        Self::new(config::admin::ADMIN_IDS.iter().copied())
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    /// `Unauthorized` unless `user_id` is an admin.
    pub fn require_admin(&self, user_id: i64) -> AppResult<()> {
        if self.is_admin(user_id) {
            Ok(())
        } else {
            log::warn!("User {} attempted an admin action", user_id);
            Err(AppError::Unauthorized(format!("user {} is not an admin", user_id)))
        }
    }

    pub fn admin_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.admins.iter().copied()
    }
}
