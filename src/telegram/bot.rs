//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "browse the catalog")]
    Products,
    #[command(description = "browse by category")]
    Categories,
    #[command(description = "find a product by name or description")]
    Search(String),
    #[command(description = "your orders")]
    Orders,
    #[command(description = "your orders")]
    MyOrders,
    #[command(description = "your wishlist")]
    Wishlist,
    #[command(description = "your profile")]
    Profile,
    #[command(description = "contact support")]
    Contact,
    #[command(description = "contact support")]
    ContactSupport,
    #[command(description = "settings")]
    Settings,
    #[command(description = "shop stats (admins only)")]
    Admin,
    #[command(description = "add a product (admins only)")]
    Addproduct(String),
    #[command(description = "pending orders (admins only)")]
    ManageOrders,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token or invalid BOT_API_URL
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set");
    }
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// Aliases (`/my_orders`, `/contact_support`) stay out of the menu.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<_> = Command::bot_commands()
        .into_iter()
        .filter(|c| !matches!(c.command.trim_start_matches('/'), "my_orders" | "contact_support"))
        .collect();
    bot.set_my_commands(commands).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        let commands = Command::descriptions().to_string();
        assert!(commands.contains("Available commands"));
        assert!(commands.contains("/my_orders"));
        assert!(commands.contains("/manage_orders"));
        assert!(commands.contains("/addproduct"));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            Command::parse("/search rust book", "shopbot").unwrap(),
            Command::Search("rust book".to_string())
        );
        assert_eq!(Command::parse("/my_orders", "shopbot").unwrap(), Command::MyOrders);
        assert_eq!(
            Command::parse("/addproduct A | b | 1 | 0", "shopbot").unwrap(),
            Command::Addproduct("A | b | 1 | 0".to_string())
        );
    }
}
