use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use shopbot::cli::{Cli, Commands};
use shopbot::core::web_server::{start_web_server, WebState};
use shopbot::core::{config, init_logger, log_configuration, AdminPolicy};
use shopbot::orders::OrderLedger;
use shopbot::payments::CryptoPayClient;
use shopbot::storage::catalog;
use shopbot::storage::{create_pool, get_connection, DbPool};
use shopbot::telegram::admin::build_product;
use shopbot::telegram::notifications::broadcast;
use shopbot::telegram::{create_bot, schema, setup_bot_commands, Bot, HandlerDeps, TelegramNotifier};

/// Main entry point for the shop bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load environment variables from .env if present (before any config is read)
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    // Dispatch to appropriate command
    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::ServeWebhooks { port }) => run_webhook_server(port).await,
        Some(Commands::AddProduct {
            name,
            description,
            price,
            discount,
            image_url,
            category,
        }) => run_add_product(
            &name,
            &description,
            &price,
            &discount,
            image_url.as_deref(),
            category.as_deref(),
        ),
        None => {
            // No command specified - default to running the bot
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

fn open_pool() -> Result<Arc<DbPool>> {
    Ok(Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    ))
}

fn build_ledger(bot: &Bot, db_pool: Arc<DbPool>) -> Arc<OrderLedger> {
    let admins = AdminPolicy::from_env();
    if admins.admin_ids().next().is_none() {
        log::warn!("No admins configured (ADMIN_IDS / ADMIN_ID); admin commands are disabled");
    }
    Arc::new(OrderLedger::new(
        db_pool,
        Arc::new(TelegramNotifier::new(bot.clone())),
        admins,
    ))
}

fn web_state(ledger: Arc<OrderLedger>) -> WebState {
    let state = WebState::new(ledger);
    if *config::payments::VERIFY_SIGNATURE {
        if config::payments::API_KEY.is_empty() {
            log::warn!("WEBHOOK_VERIFY_SIGNATURE is set but CRYPTO_PAY_API_KEY is empty; every webhook will be rejected");
        }
        state.with_signature_check(&config::payments::API_KEY)
    } else {
        state
    }
}

/// Run the bot with the webhook server alongside
async fn run_bot() -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");
    log_configuration();

    // Create bot instance
    let bot = create_bot()?;

    let bot_info = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Bot API: {}", e))?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    // Create database connection pool
    let db_pool = open_pool()?;
    let ledger = build_ledger(&bot, db_pool);

    // Notify admins about bot startup/restart
    broadcast(
        ledger.notifier().as_ref(),
        ledger.admins().admin_ids().collect::<Vec<_>>(),
        "🟢 Shop bot started",
    )
    .await;

    // Start webhook HTTP server
    let web_port = *config::web::PORT;
    let state = web_state(Arc::clone(&ledger));
    tokio::spawn(async move {
        if let Err(e) = start_web_server(web_port, state).await {
            log::error!("Web server error: {}", e);
        }
    });

    let gateway = Arc::new(CryptoPayClient::from_env()?);
    let deps = HandlerDeps::new(Arc::clone(&ledger), gateway, config::payments::ASSET.as_str());
    let handler = schema(deps);

    log::info!("================================================");
    log::info!("🎉 Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    // Run the dispatcher with retry logic
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Create a new dispatcher in a separate task to isolate panics
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            // Create polling listener that drops pending updates on start
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                // Dispatcher finished normally
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher connection after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        exponential_backoff(retry_count).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }

        sleep(config::retry::dispatcher_delay()).await;
    }

    Ok(())
}

/// Run only the webhook server; notifications still go out through the bot
async fn run_webhook_server(port: Option<u16>) -> Result<()> {
    log_configuration();

    let bot = create_bot()?;
    let db_pool = open_pool()?;
    let ledger = build_ledger(&bot, db_pool);

    let port = port.unwrap_or(*config::web::PORT);
    start_web_server(port, web_state(ledger))
        .await
        .map_err(|e| anyhow::anyhow!("Web server error: {}", e))
}

/// Seed the catalog from the shell
fn run_add_product(
    name: &str,
    description: &str,
    price: &str,
    discount: &str,
    image_url: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let new_product = build_product(name, description, price, discount, image_url, category)?;

    let db_pool = open_pool()?;
    let conn = get_connection(&db_pool)?;
    let product = catalog::create_product(&conn, &new_product)?;

    println!(
        "Added product #{}: {} ({} -> {})",
        product.id,
        product.name,
        product.price,
        product.effective_price()
    );
    Ok(())
}

async fn exponential_backoff(retry_count: u32) {
    let delay = Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count));
    sleep(delay).await;
}
