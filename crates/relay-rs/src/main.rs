//! Entry point for the `relay` Telegram bot.

use anyhow::Context;
use log::{error, info, warn};
use relay_rs::config::RelayConfig;
use relay_rs::core::{Dispatcher, MediaFetcher, build_llm_provider};
use relay_rs::sheets::{GoogleSheetsClient, SheetStore};
use relay_rs::telegram::{self, TelegramMedia};
use std::sync::Arc;
use teloxide::Bot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    relay_rs::init_logging();

    let config = RelayConfig::from_env().context("failed to load config")?;
    info!(
        "starting relay (dotenv={}, llm_key_set={}, sheet_set={}, sheet_key_set={}, credentials_set={}, images_enabled={})",
        dotenv_loaded,
        config.llm.api_key.is_some(),
        config.sheets.spreadsheet_id.is_some(),
        config.sheets.api_key.is_some(),
        config.sheets.credentials_file.is_some(),
        config.images.enabled
    );

    let Some(token) = config.telegram.bot_token.clone() else {
        warn!("TELEGRAM_BOT_TOKEN is not configured; the relay will not start");
        return Ok(());
    };

    let llm = build_llm_provider(&config.llm).context("failed to build LLM provider")?;
    let sheets = match GoogleSheetsClient::new(&config.sheets) {
        Ok(client) => client,
        Err(err) => {
            error!("failed to load sheet write credentials, continuing read-only: {err}");
            GoogleSheetsClient::with_http(&config.sheets, reqwest::Client::new())
        }
    };
    info!(
        "sheet store ready (authenticated_writes={})",
        sheets.has_write_credentials()
    );
    let sheets: Arc<dyn SheetStore> = Arc::new(sheets);

    let bot = Bot::new(token);
    let media: Arc<dyn MediaFetcher> = Arc::new(TelegramMedia::new(bot.clone()));
    let relay = Dispatcher::from_config(&config, llm, sheets, media)
        .context("failed to initialise message dispatcher")?;

    telegram::run(bot, Arc::new(relay)).await;
    Ok(())
}
