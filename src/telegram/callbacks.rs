//! Inline button payloads and the keyboards that carry them

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::storage::catalog::Product;
use crate::storage::orders::Order;

/// Telegram rejects a button whose `callback_data` is longer than this (bytes).
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

const CATEGORY_PREFIX: &str = "category_";

/// Whether a category name still fits into its button's `callback_data`.
pub fn category_fits_button(name: &str) -> bool {
    CATEGORY_PREFIX.len() + name.len() <= MAX_CALLBACK_DATA_LEN
}

/// Parsed `callback_data` of an inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Buy(i64),
    Approve(i64),
    Cancel(i64),
    WishlistAdd(i64),
    Category(String),
}

impl CallbackAction {
    /// `None` for unknown prefixes or non-numeric ids.
    pub fn parse(data: &str) -> Option<Self> {
        // wishlist_add_ before the shorter prefixes
        if let Some(id) = data.strip_prefix("wishlist_add_") {
            return id.parse().ok().map(CallbackAction::WishlistAdd);
        }
        if let Some(id) = data.strip_prefix("buy_") {
            return id.parse().ok().map(CallbackAction::Buy);
        }
        if let Some(id) = data.strip_prefix("approve_") {
            return id.parse().ok().map(CallbackAction::Approve);
        }
        if let Some(id) = data.strip_prefix("cancel_") {
            return id.parse().ok().map(CallbackAction::Cancel);
        }
        if let Some(name) = data.strip_prefix(CATEGORY_PREFIX) {
            if name.is_empty() {
                return None;
            }
            return Some(CallbackAction::Category(name.to_string()));
        }
        None
    }

    pub fn data(&self) -> String {
        match self {
            CallbackAction::Buy(id) => format!("buy_{}", id),
            CallbackAction::Approve(id) => format!("approve_{}", id),
            CallbackAction::Cancel(id) => format!("cancel_{}", id),
            CallbackAction::WishlistAdd(id) => format!("wishlist_add_{}", id),
            CallbackAction::Category(name) => format!("{}{}", CATEGORY_PREFIX, name),
        }
    }

    fn button(&self, label: &str) -> InlineKeyboardButton {
        InlineKeyboardButton::callback(label.to_string(), self.data())
    }
}

/// "Buy Now" and "Add to wishlist" under a product.
pub fn product_keyboard(product: &Product) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        CallbackAction::Buy(product.id).button("🛒 Buy Now"),
        CallbackAction::WishlistAdd(product.id).button("❤️ Wishlist"),
    ]])
}

/// One button per category, two per row.
///
/// Names too long for `callback_data` are left out; a single oversized
/// button would make Telegram reject the whole keyboard.
pub fn categories_keyboard(categories: &[String]) -> InlineKeyboardMarkup {
    let usable: Vec<&String> = categories
        .iter()
        .filter(|name| {
            let fits = category_fits_button(name);
            if !fits {
                log::warn!("Category '{}' is too long for a button, skipping", name);
            }
            fits
        })
        .collect();

    let rows: Vec<Vec<InlineKeyboardButton>> = usable
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .map(|name| CallbackAction::Category((*name).clone()).button(name))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// Approve / cancel buttons for a pending order.
pub fn manage_order_keyboard(order: &Order) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        CallbackAction::Approve(order.id).button("✅ Approve"),
        CallbackAction::Cancel(order.id).button("❌ Cancel"),
    ]])
}
