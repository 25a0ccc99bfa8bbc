use async_trait::async_trait;
use teloxide::prelude::*;

use crate::core::error::{AppError, AppResult};

/// Delivers a text message to a user's chat.
///
/// Fire-and-forget from the caller's point of view: there is no delivery
/// tracking and no retry. Callers log the error and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<()>;
}

/// Notifier backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|e| AppError::Upstream(format!("send_message to {} failed: {}", chat_id, e)))
    }
}

/// Sends `text` to every chat, logging failures individually.
pub async fn broadcast(notifier: &dyn Notifier, chat_ids: impl IntoIterator<Item = i64>, text: &str) -> usize {
    let mut delivered = 0;
    for chat_id in chat_ids {
        match notifier.send(chat_id, text).await {
            Ok(()) => delivered += 1,
            Err(e) => log::error!("Failed to notify {}: {}", chat_id, e),
        }
    }
    delivered
}
