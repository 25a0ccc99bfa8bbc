//! Admin functionality for the Telegram bot
//!
//! This module contains all admin-related commands:
//! - Shop stats (/admin)
//! - Catalog additions (/addproduct)
//! - Pending order moderation (/manage_orders and the approve/cancel buttons)

use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;
use teloxide::prelude::*;
use url::Url;

use crate::core::error::{AppError, AppResult};
use crate::orders::OrderLedger;
use crate::storage::catalog::{self, NewProduct};
use crate::storage::db::get_connection;
use crate::telegram::callbacks::{category_fits_button, manage_order_keyboard, MAX_CALLBACK_DATA_LEN};
use crate::telegram::format;

const UNAUTHORIZED_TEXT: &str = "❌ Unauthorized access.";

/// Longest category that still fits a `category_<name>` button.
const MAX_CATEGORY_BYTES: usize = MAX_CALLBACK_DATA_LEN - "category_".len();

pub const ADD_PRODUCT_USAGE: &str =
    "Usage: /addproduct name | description | price | discount | image_url | category\n\
     Example: /addproduct Headphones | Wireless, 20h battery | 100 | 10 | https://example.com/h.jpg | Electronics";

/// Parses `/addproduct` arguments.
///
/// `name | description | price | discount | image_url | category`; the last
/// two fields may be empty or omitted.
pub fn parse_add_product(args: &str) -> AppResult<NewProduct> {
    let fields: Vec<&str> = args.split('|').map(str::trim).collect();
    if fields.len() < 4 || fields.len() > 6 {
        return Err(AppError::Validation(format!(
            "expected 4 to 6 fields separated by '|', got {}",
            fields.len()
        )));
    }

    let optional = |idx: usize| fields.get(idx).copied().filter(|v| !v.is_empty());
    build_product(
        fields[0],
        fields[1],
        fields[2],
        fields[3],
        optional(4),
        optional(5),
    )
}

/// Validates raw product fields; shared by /addproduct and the CLI.
pub fn build_product(
    name: &str,
    description: &str,
    price: &str,
    discount: &str,
    image_url: Option<&str>,
    category: Option<&str>,
) -> AppResult<NewProduct> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is empty".to_string()));
    }

    let price = Decimal::from_str(price.trim())
        .map_err(|_| AppError::Validation(format!("price '{}' is not a number", price)))?;
    if price <= Decimal::ZERO {
        return Err(AppError::Validation("price must be positive".to_string()));
    }

    let discount_raw = discount.trim().trim_end_matches('%').trim();
    let discount = if discount_raw.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from_str(discount_raw)
            .map_err(|_| AppError::Validation(format!("discount '{}' is not a number", discount)))?
    };
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation("discount must be between 0 and 100".to_string()));
    }

    let image_url = image_url.map(str::trim).filter(|v| !v.is_empty());
    if let Some(raw) = image_url {
        Url::parse(raw).map_err(|e| AppError::Validation(format!("image_url '{}' is invalid: {}", raw, e)))?;
    }

    let category = category.map(str::trim).filter(|v| !v.is_empty());
    if let Some(raw) = category {
        if !category_fits_button(raw) {
            return Err(AppError::Validation(format!(
                "category '{}' is too long ({} bytes); keep it under {} bytes",
                raw,
                raw.len(),
                MAX_CATEGORY_BYTES
            )));
        }
    }

    Ok(NewProduct {
        name: name.to_string(),
        description: description.trim().to_string(),
        price,
        discount,
        image_url: image_url.map(str::to_string),
        category: category.map(str::to_string),
    })
}

/// Handle /admin command - show shop stats
pub async fn handle_admin_command(bot: &Bot, chat_id: ChatId, user_id: i64, ledger: &OrderLedger) -> Result<()> {
    if ledger.admins().require_admin(user_id).is_err() {
        bot.send_message(chat_id, UNAUTHORIZED_TEXT).await?;
        return Ok(());
    }

    let stats = ledger.stats()?;
    bot.send_message(chat_id, format::admin_stats_text(&stats)).await?;
    Ok(())
}

/// Handle /addproduct command
pub async fn handle_addproduct_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    args: &str,
    ledger: &OrderLedger,
) -> Result<()> {
    if ledger.admins().require_admin(user_id).is_err() {
        bot.send_message(chat_id, UNAUTHORIZED_TEXT).await?;
        return Ok(());
    }

    let new_product = match parse_add_product(args) {
        Ok(p) => p,
        Err(e) => {
            log::info!("Admin {} sent invalid /addproduct: {}", user_id, e);
            bot.send_message(chat_id, format!("❌ {}\n\n{}", e, ADD_PRODUCT_USAGE))
                .await?;
            return Ok(());
        }
    };

    let product = {
        let conn = get_connection(ledger.db_pool())?;
        catalog::create_product(&conn, &new_product)?
    };
    log::info!("Admin {} added product {} ({})", user_id, product.id, product.name);

    bot.send_message(
        chat_id,
        format!("✅ Product #{} added\n\n{}", product.id, format::product_caption(&product)),
    )
    .await?;
    Ok(())
}

/// Handle /manage_orders command - one message per pending order with buttons
pub async fn handle_manage_orders_command(bot: &Bot, chat_id: ChatId, user_id: i64, ledger: &OrderLedger) -> Result<()> {
    if ledger.admins().require_admin(user_id).is_err() {
        bot.send_message(chat_id, UNAUTHORIZED_TEXT).await?;
        return Ok(());
    }

    let pending = ledger.list_pending()?;
    if pending.is_empty() {
        bot.send_message(chat_id, "No pending orders.").await?;
        return Ok(());
    }

    for order in &pending {
        let product_name = {
            let conn = get_connection(ledger.db_pool())?;
            catalog::get_product(&conn, order.product_id)?.map(|p| p.name)
        };
        bot.send_message(chat_id, format::pending_order_text(order, product_name.as_deref()))
            .reply_markup(manage_order_keyboard(order))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_full_line() {
        let product = parse_add_product(
            "Headphones | Wireless, 20h | 100 | 10 | https://example.com/h.jpg | Electronics",
        )
        .unwrap();
        assert_eq!(
            product,
            NewProduct {
                name: "Headphones".to_string(),
                description: "Wireless, 20h".to_string(),
                price: dec!(100),
                discount: dec!(10),
                image_url: Some("https://example.com/h.jpg".to_string()),
                category: Some("Electronics".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_optional_fields() {
        let product = parse_add_product("Book | Paperback | 12.50 | 0%").unwrap();
        assert_eq!(product.price, dec!(12.50));
        assert_eq!(product.discount, dec!(0));
        assert!(product.image_url.is_none());
        assert!(product.category.is_none());

        let product = parse_add_product("Book | Paperback | 12.50 | | | Books").unwrap();
        assert!(product.image_url.is_none());
        assert_eq!(product.category.as_deref(), Some("Books"));
    }

    #[test]
    fn test_category_length_limit() {
        let longest = "c".repeat(MAX_CATEGORY_BYTES);
        let product = build_product("Book", "", "10", "0", None, Some(&longest)).unwrap();
        assert_eq!(product.category.as_deref(), Some(longest.as_str()));

        let too_long = format!("{}c", longest);
        let err = build_product("Book", "", "10", "0", None, Some(&too_long)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("too long")));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for args in [
            "",
            "Only | three | fields",
            " | desc | 10 | 0",
            "Book | desc | abc | 0",
            "Book | desc | 0 | 0",
            "Book | desc | 10 | 150",
            "Book | desc | 10 | 0 | not a url | Books",
            "a | b | 1 | 0 | | | extra",
            "Book | d | 10 | 0 | | Электроника и бытовая техника для дома",
        ] {
            assert!(
                matches!(parse_add_product(args), Err(AppError::Validation(_))),
                "'{}' should be rejected",
                args
            );
        }
    }
}
