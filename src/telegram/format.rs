//! Plain-text rendering of catalog, orders and profile replies

use rust_decimal::Decimal;

use crate::orders::{Checkout, ShopStats};
use crate::storage::catalog::Product;
use crate::storage::orders::Order;
use crate::storage::users::User;

pub fn welcome_text(name: &str) -> String {
    if name.is_empty() {
        "Welcome to the shop! You are now registered.".to_string()
    } else {
        format!("Welcome to the shop, {}! You are now registered.", name)
    }
}

/// Reply to /start, listing what the bot can do.
pub fn start_text(is_admin: bool) -> String {
    let mut text = String::from(
        "🛍 Shop commands:\n\
         /products - browse the catalog\n\
         /categories - browse by category\n\
         /search <text> - find a product\n\
         /orders - your orders\n\
         /wishlist - saved products\n\
         /profile - your profile\n\
         /contact - reach support",
    );
    if is_admin {
        text.push_str(
            "\n\n🔧 Admin:\n\
             /admin - shop stats\n\
             /addproduct name | description | price | discount | image_url | category\n\
             /manage_orders - pending orders",
        );
    }
    text
}

pub fn format_amount(amount: Decimal) -> String {
    format!("${}", amount.normalize())
}

/// Caption shown under a product photo or as a product message.
pub fn product_caption(product: &Product) -> String {
    let mut caption = format!("{}\n{}\n", product.name, product.description);
    if product.has_discount() {
        caption.push_str(&format!(
            "Price: {} (was {}, -{}%)",
            format_amount(product.effective_price()),
            format_amount(product.price),
            product.discount.normalize()
        ));
    } else {
        caption.push_str(&format!("Price: {}", format_amount(product.effective_price())));
    }
    if let Some(category) = product.category.as_deref().filter(|c| !c.is_empty()) {
        caption.push_str(&format!("\nCategory: {}", category));
    }
    caption
}

/// One line per order, newest last.
pub fn order_list(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "You have no orders yet.".to_string();
    }
    let lines: Vec<String> = orders.iter().map(order_line).collect();
    format!("Your orders:\n\n{}", lines.join("\n"))
}

pub fn order_line(order: &Order) -> String {
    format!(
        "{} #{} · {} · {} · {}",
        order.status.emoji(),
        order.id,
        format_amount(order.amount),
        order.status,
        order.created_at.format("%Y-%m-%d %H:%M")
    )
}

pub fn wishlist_text(products: &[Product]) -> String {
    if products.is_empty() {
        return "Your wishlist is empty.".to_string();
    }
    let lines: Vec<String> = products
        .iter()
        .map(|p| format!("• {} - {}", p.name, format_amount(p.effective_price())))
        .collect();
    format!("Your wishlist:\n\n{}", lines.join("\n"))
}

pub fn profile_text(user: &User, order_count: usize, wishlist_count: usize) -> String {
    let name = if user.full_name.is_empty() { "-" } else { user.full_name.as_str() };
    let username = user.username.as_deref().map(|u| format!("@{}", u)).unwrap_or_else(|| "-".to_string());
    format!(
        "Your Profile:\n\nName: {}\nUsername: {}\nRegistered At: {}\nOrders: {}\nWishlist: {}",
        name,
        username,
        user.registered_at.format("%Y-%m-%d %H:%M UTC"),
        order_count,
        wishlist_count
    )
}

pub fn admin_stats_text(stats: &ShopStats) -> String {
    format!(
        "Admin Stats:\n\nTotal Users: {}\nTotal Orders: {}\nPending Orders: {}\nTotal Revenue: {}",
        stats.total_users,
        stats.total_orders,
        stats.pending_orders,
        format_amount(stats.paid_revenue)
    )
}

/// Message sent after an invoice is created.
pub fn checkout_text(checkout: &Checkout) -> String {
    format!(
        "🧾 Order #{} for {}\nAmount: {}\n\nPay here: {}",
        checkout.order.id,
        checkout.product.name,
        format_amount(checkout.order.amount),
        checkout.invoice.pay_url
    )
}

pub fn pending_order_text(order: &Order, product_name: Option<&str>) -> String {
    format!(
        "⏳ Order #{}\nUser: {}\nProduct: {}\nAmount: {}\nCreated: {}",
        order.id,
        order.user_id,
        product_name.unwrap_or("(removed)"),
        format_amount(order.amount),
        order.created_at.format("%Y-%m-%d %H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::OrderStatus;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn product(discount: Decimal) -> Product {
        Product {
            id: 1,
            name: "Headphones".to_string(),
            description: "Wireless".to_string(),
            price: dec!(100),
            discount,
            image_url: None,
            category: Some("Electronics".to_string()),
        }
    }

    #[test]
    fn test_caption_shows_effective_price() {
        let caption = product_caption(&product(dec!(10)));
        assert_eq!(
            caption,
            "Headphones\nWireless\nPrice: $90 (was $100, -10%)\nCategory: Electronics"
        );
    }

    #[test]
    fn test_caption_without_discount() {
        let caption = product_caption(&product(dec!(0)));
        assert!(caption.contains("Price: $100"));
        assert!(!caption.contains("was"));
    }

    #[test]
    fn test_order_list() {
        assert_eq!(order_list(&[]), "You have no orders yet.");

        let order = Order {
            id: 7,
            user_id: 1,
            product_id: 1,
            amount: dec!(90.00),
            status: OrderStatus::Paid,
            payment_id: Some("INV1".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        };
        let text = order_list(&[order]);
        assert!(text.contains("#7 · $90 · paid · 2024-05-01 12:30"));
    }

    #[test]
    fn test_admin_stats() {
        let text = admin_stats_text(&ShopStats {
            total_users: 3,
            total_orders: 5,
            pending_orders: 2,
            paid_revenue: dec!(180.50),
        });
        assert!(text.contains("Total Users: 3"));
        assert!(text.contains("Pending Orders: 2"));
        assert!(text.contains("Total Revenue: $180.5"));
    }

    #[test]
    fn test_start_text_admin_section() {
        assert!(!start_text(false).contains("/addproduct"));
        assert!(start_text(true).contains("/addproduct"));
    }
}
