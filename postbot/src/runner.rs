//! Application bootstrap for the `run` and `dispatch` subcommands.

use crate::config::Config;
use crate::dispatch::{DispatchEngine, DispatchSummary};
use crate::draft::DraftTable;
use crate::handlers::ScheduleHandler;
use crate::telegram::{run_polling, TelegramBotAdapter};
use postbot_core::{init_tracing, Bot};
use postbot_store::ScheduleStore;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Build the teloxide bot, pointing it at a custom API server when one is
/// configured (e.g. a local Bot API instance).
fn build_teloxide_bot(config: &Config) -> teloxide::Bot {
    let bot = teloxide::Bot::new(&config.bot_token);
    match &config.telegram_api_url {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = url_str, "Invalid Telegram API URL, using default");
                bot
            }
        },
        None => bot,
    }
}

/// Start the bot and poll for updates until the process is stopped.
#[instrument(skip(config))]
pub async fn run_bot(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;
    info!(
        schedule_file = %config.schedule_file.display(),
        admin_id = config.admin_id,
        "Initializing bot"
    );

    let bot = build_teloxide_bot(&config);
    let adapter: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(bot.clone()));
    let store = Arc::new(ScheduleStore::new(&config.schedule_file));
    let drafts = Arc::new(DraftTable::new());
    let handler = Arc::new(ScheduleHandler::new(
        adapter,
        store,
        drafts,
        config.admin_id,
        config.timezone_offset,
    ));

    info!("Bot started successfully");
    run_polling(bot, handler).await
}

/// Run one dispatch pass and exit.
#[instrument(skip(config))]
pub async fn run_dispatch(config: Config) -> anyhow::Result<DispatchSummary> {
    config.validate()?;
    let target_chat_id = config.require_target_chat()?;
    init_tracing(&config.log_file)?;
    info!(
        schedule_file = %config.schedule_file.display(),
        target_chat_id,
        "Running dispatch pass"
    );

    let bot = build_teloxide_bot(&config);
    let adapter: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(bot));
    let store = Arc::new(ScheduleStore::new(&config.schedule_file));
    let engine = DispatchEngine::new(adapter, store, target_chat_id);

    let summary = engine.run_once().await?;
    info!(
        sent = summary.sent,
        failed = summary.failed,
        pending = summary.pending,
        "Dispatch run finished"
    );
    Ok(summary)
}
