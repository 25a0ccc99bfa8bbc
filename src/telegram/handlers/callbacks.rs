//! Inline button handlers (buy, wishlist, category, approve/cancel)

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::commands::send_products;
use super::types::{ensure_user_exists, HandlerDeps, HandlerError, UserInfo};
use crate::core::error::AppError;
use crate::orders::{start_purchase, TransitionOutcome};
use crate::storage::catalog;
use crate::storage::db::get_connection;
use crate::storage::users;
use crate::telegram::callbacks::CallbackAction;
use crate::telegram::format;
use crate::telegram::Bot;

/// Handles callback queries from the inline keyboards.
pub(super) async fn handle_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| ChatId::from(q.from.id));
    let info = UserInfo::from_user(&q.from);

    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        log::warn!("Unknown callback data {:?} from {}", q.data, info.telegram_id);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    log::info!("Callback {:?} from user {}", action, info.telegram_id);

    // Stop the button spinner before doing the work
    bot.answer_callback_query(q.id.clone()).await?;

    let (user, _) = ensure_user_exists(&deps, &info, &action.data())?;

    match action {
        CallbackAction::Buy(product_id) => {
            match start_purchase(
                &deps.ledger,
                deps.gateway.as_ref(),
                &deps.asset,
                user.telegram_id,
                product_id,
            )
            .await
            {
                Ok(checkout) => {
                    let mut request = bot.send_message(chat_id, format::checkout_text(&checkout));
                    if let Ok(pay_url) = url::Url::parse(&checkout.invoice.pay_url) {
                        request = request.reply_markup(InlineKeyboardMarkup::new(vec![vec![
                            InlineKeyboardButton::url("💳 Pay", pay_url),
                        ]]));
                    }
                    request.await?;
                }
                Err(AppError::NotFound(_)) => {
                    bot.send_message(chat_id, "❌ This product is no longer available.").await?;
                }
                Err(e) => {
                    log::error!("Checkout failed for user {} product {}: {}", user.telegram_id, product_id, e);
                    bot.send_message(chat_id, "❌ Could not create the invoice. Please try again later.")
                        .await?;
                }
            }
        }
        CallbackAction::WishlistAdd(product_id) => {
            let added = {
                let conn = get_connection(&deps.db_pool)?;
                match catalog::get_product(&conn, product_id)? {
                    Some(_) => Some(users::add_to_wishlist(&conn, user.id, product_id)?),
                    None => None,
                }
            };
            let text = match added {
                Some(true) => "❤️ Added to your wishlist.",
                Some(false) => "Already in your wishlist.",
                None => "❌ This product is no longer available.",
            };
            bot.send_message(chat_id, text).await?;
        }
        CallbackAction::Category(name) => {
            let products = {
                let conn = get_connection(&deps.db_pool)?;
                catalog::list_by_category(&conn, &name)?
            };
            if products.is_empty() {
                bot.send_message(chat_id, "No products found in this category.").await?;
            } else {
                send_products(&bot, chat_id, &products).await?;
            }
        }
        CallbackAction::Approve(order_id) => {
            let result = deps.ledger.approve(user.telegram_id, order_id).await;
            reply_moderation(&bot, chat_id, order_id, "approved", result).await?;
        }
        CallbackAction::Cancel(order_id) => {
            let result = deps.ledger.cancel(user.telegram_id, order_id).await;
            reply_moderation(&bot, chat_id, order_id, "canceled", result).await?;
        }
    }

    Ok(())
}

async fn reply_moderation(
    bot: &Bot,
    chat_id: ChatId,
    order_id: i64,
    verb: &str,
    result: Result<TransitionOutcome, AppError>,
) -> Result<(), HandlerError> {
    let text = match result {
        Ok(TransitionOutcome::Applied(order)) => format!("✅ Order #{} {}.", order.id, verb),
        Ok(TransitionOutcome::Rejected(order)) => {
            format!("Order #{} is already {}; nothing changed.", order.id, order.status)
        }
        Err(AppError::Unauthorized(_)) => "❌ Unauthorized access.".to_string(),
        Err(AppError::NotFound(_)) => format!("❌ Order #{} not found.", order_id),
        Err(e) => {
            log::error!("Failed to update order {}: {}", order_id, e);
            format!("❌ Failed to update order #{}.", order_id)
        }
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}
