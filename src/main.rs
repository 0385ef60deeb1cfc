use anyhow::Result;
use std::env;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use classroster::bot::{schema, Command, CommandService, TelegramMessenger};
use classroster::config::Config;
use classroster::explainer::{ExplanationGateway, OpenAiExplainer};
use classroster::{health, localization, store};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Class Roster Telegram Bot");

    // Missing credentials are fatal
    let config = Config::from_env()?;

    localization::init_localization()?;

    let record_store = store::connect(&config.store).await?;
    let explainer: Arc<dyn ExplanationGateway> =
        Arc::new(OpenAiExplainer::new(config.generation.clone()));

    let bot = Bot::new(&config.bot_token);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));

    let service = Arc::new(CommandService::new(
        record_store,
        explainer,
        messenger,
        config.scope_mode,
    ));

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register command list with Telegram");
    }

    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            error!(error = ?e, "Health server stopped");
        }
    });

    info!(scope_mode = ?config.scope_mode, "Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![service])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
