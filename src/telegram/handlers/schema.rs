//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::callbacks::handle_callback;
use super::commands::{
    handle_categories_command, handle_contact_command, handle_orders_command, handle_products_command,
    handle_profile_command, handle_search_command, handle_settings_command, handle_start_command,
    handle_wishlist_command, register_sender,
};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::admin::{handle_addproduct_command, handle_admin_command, handle_manage_orders_command};
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Builds the shop's update tree: commands, then plain text, then button presses.
///
/// Handler failures are logged and answered with a generic apology; the
/// tree itself never returns an error to the dispatcher.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps.clone();

    dptree::entry()
        .branch(command_handler(deps_commands))
        // Plain text: register the sender and point them at /start
        .branch(message_handler(deps_messages))
        // Inline buttons: buy, wishlist, category, approve/cancel
        .branch(callback_handler(deps_callback))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);
                let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);

                let result = match &cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await,
                    Command::Products => handle_products_command(&bot, &msg, &deps).await,
                    Command::Categories => handle_categories_command(&bot, &msg, &deps).await,
                    Command::Search(query) => handle_search_command(&bot, &msg, &deps, query).await,
                    Command::Orders | Command::MyOrders => handle_orders_command(&bot, &msg, &deps).await,
                    Command::Wishlist => handle_wishlist_command(&bot, &msg, &deps).await,
                    Command::Profile => handle_profile_command(&bot, &msg, &deps).await,
                    Command::Contact | Command::ContactSupport => handle_contact_command(&bot, &msg, &deps).await,
                    Command::Settings => handle_settings_command(&bot, &msg, &deps).await,
                    Command::Admin => admin_command(&bot, &msg, &deps, user_id, AdminCommand::Stats).await,
                    Command::Addproduct(args) => {
                        admin_command(&bot, &msg, &deps, user_id, AdminCommand::AddProduct(args)).await
                    }
                    Command::ManageOrders => {
                        admin_command(&bot, &msg, &deps, user_id, AdminCommand::ManageOrders).await
                    }
                };

                if let Err(e) = result {
                    log::error!("❌ Command {:?} failed for chat {}: {}", cmd, msg.chat.id, e);
                    let _ = bot
                        .send_message(msg.chat.id, "❌ Something went wrong. Please try again later.")
                        .await;
                }
                Ok(())
            }
        },
    ))
}

enum AdminCommand<'a> {
    Stats,
    AddProduct(&'a str),
    ManageOrders,
}

async fn admin_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    user_id: i64,
    command: AdminCommand<'_>,
) -> Result<(), HandlerError> {
    register_sender(bot, msg, deps, "admin command").await?;
    let outcome = match command {
        AdminCommand::Stats => handle_admin_command(bot, msg.chat.id, user_id, &deps.ledger).await,
        AdminCommand::AddProduct(args) => {
            handle_addproduct_command(bot, msg.chat.id, user_id, args, &deps.ledger).await
        }
        AdminCommand::ManageOrders => handle_manage_orders_command(bot, msg.chat.id, user_id, &deps.ledger).await,
    };
    Ok(outcome?)
}

/// Handler for non-command text messages
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                match register_sender(&bot, &msg, &deps, "message").await {
                    Ok(Some(_)) => {
                        let _ = bot
                            .send_message(msg.chat.id, "Send /start to see what I can do.")
                            .await;
                    }
                    Ok(None) => {}
                    Err(e) => log::error!("Failed to register sender in chat {}: {}", msg.chat.id, e),
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_callback(bot, q, deps).await {
                log::error!("❌ Callback handler failed: {}", e);
            }
            Ok(())
        }
    })
}
