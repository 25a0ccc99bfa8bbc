//! Command handler implementations

use teloxide::prelude::*;
use teloxide::types::{InputFile, Message};

use super::types::{ensure_user_exists, HandlerDeps, HandlerError, UserInfo};
use crate::core::config;
use crate::storage::catalog::{self, Product};
use crate::storage::db::get_connection;
use crate::storage::users::{self, User};
use crate::telegram::callbacks::{categories_keyboard, product_keyboard};
use crate::telegram::format;
use crate::telegram::Bot;

/// Registers the sender (greeting them on first contact) and returns the
/// stored user, or `None` for messages without a sender.
pub(super) async fn register_sender(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    action: &str,
) -> Result<Option<User>, HandlerError> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(None);
    };
    let info = UserInfo::from_user(from);
    let (user, created) = ensure_user_exists(deps, &info, action)?;
    if created {
        bot.send_message(msg.chat.id, format::welcome_text(&user.full_name)).await?;
    }
    Ok(Some(user))
}

/// Sends each product as a photo (or text when it has no image) with its buttons.
pub(super) async fn send_products(bot: &Bot, chat_id: ChatId, products: &[Product]) -> Result<(), HandlerError> {
    for product in products.iter().take(config::catalog::MAX_LISTED_PRODUCTS) {
        let caption = format::product_caption(product);
        let keyboard = product_keyboard(product);

        let photo = product.image_url.as_deref().and_then(|raw| url::Url::parse(raw).ok());
        if let Some(photo_url) = photo {
            match bot
                .send_photo(chat_id, InputFile::url(photo_url))
                .caption(caption.clone())
                .reply_markup(keyboard.clone())
                .await
            {
                Ok(_) => continue,
                Err(e) => log::warn!("Failed to send photo for product {}: {}", product.id, e),
            }
        }
        bot.send_message(chat_id, caption).reply_markup(keyboard).await?;
    }

    if products.len() > config::catalog::MAX_LISTED_PRODUCTS {
        bot.send_message(
            chat_id,
            format!(
                "Showing {} of {} products. Use /search or /categories to narrow it down.",
                config::catalog::MAX_LISTED_PRODUCTS,
                products.len()
            ),
        )
        .await?;
    }
    Ok(())
}

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = register_sender(bot, msg, deps, "/start").await? else {
        return Ok(());
    };
    bot.send_message(msg.chat.id, format::start_text(deps.is_admin(user.telegram_id)))
        .await?;
    Ok(())
}

/// Handle /products command
pub(super) async fn handle_products_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    register_sender(bot, msg, deps, "/products").await?;
    let products = {
        let conn = get_connection(&deps.db_pool)?;
        catalog::list_products(&conn)?
    };
    if products.is_empty() {
        bot.send_message(msg.chat.id, "The catalog is empty for now.").await?;
        return Ok(());
    }
    send_products(bot, msg.chat.id, &products).await
}

/// Handle /categories command
pub(super) async fn handle_categories_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    register_sender(bot, msg, deps, "/categories").await?;
    let mut categories = {
        let conn = get_connection(&deps.db_pool)?;
        catalog::list_categories(&conn)?
    };
    if categories.is_empty() {
        categories = config::catalog::DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    }
    bot.send_message(msg.chat.id, "Choose a category:")
        .reply_markup(categories_keyboard(&categories))
        .await?;
    Ok(())
}

/// Handle /search command
pub(super) async fn handle_search_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    query: &str,
) -> Result<(), HandlerError> {
    register_sender(bot, msg, deps, "/search").await?;
    if query.trim().is_empty() {
        bot.send_message(msg.chat.id, "Usage: /search <text>").await?;
        return Ok(());
    }
    let products = {
        let conn = get_connection(&deps.db_pool)?;
        catalog::search_products(&conn, query)?
    };
    if products.is_empty() {
        bot.send_message(msg.chat.id, format!("Nothing found for \"{}\".", query.trim()))
            .await?;
        return Ok(());
    }
    send_products(bot, msg.chat.id, &products).await
}

/// Handle /orders and /my_orders commands
pub(super) async fn handle_orders_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = register_sender(bot, msg, deps, "/orders").await? else {
        return Ok(());
    };
    let orders = deps.ledger.list_by_user(user.telegram_id)?;
    bot.send_message(msg.chat.id, format::order_list(&orders)).await?;
    Ok(())
}

/// Handle /wishlist command
pub(super) async fn handle_wishlist_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = register_sender(bot, msg, deps, "/wishlist").await? else {
        return Ok(());
    };
    let products = {
        let conn = get_connection(&deps.db_pool)?;
        users::list_wishlist(&conn, user.id)?
    };
    bot.send_message(msg.chat.id, format::wishlist_text(&products)).await?;
    Ok(())
}

/// Handle /profile command
pub(super) async fn handle_profile_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = register_sender(bot, msg, deps, "/profile").await? else {
        return Ok(());
    };
    let order_count = deps.ledger.list_by_user(user.telegram_id)?.len();
    let wishlist_count = {
        let conn = get_connection(&deps.db_pool)?;
        users::list_wishlist(&conn, user.id)?.len()
    };
    bot.send_message(msg.chat.id, format::profile_text(&user, order_count, wishlist_count))
        .await?;
    Ok(())
}

/// Handle /contact and /contact_support commands
pub(super) async fn handle_contact_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    register_sender(bot, msg, deps, "/contact").await?;
    bot.send_message(
        msg.chat.id,
        format!("📞 Questions about an order? Write to {}", config::SUPPORT_CONTACT.as_str()),
    )
    .await?;
    Ok(())
}

/// Handle /settings command
pub(super) async fn handle_settings_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = register_sender(bot, msg, deps, "/settings").await? else {
        return Ok(());
    };
    bot.send_message(
        msg.chat.id,
        format!(
            "⚙️ Settings\n\nPayment asset: {}\nOrder notifications: on\nAccount ID: {}",
            deps.asset, user.telegram_id
        ),
    )
    .await?;
    Ok(())
}
