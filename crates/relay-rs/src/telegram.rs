//! Telegram transport adapter.
//!
//! Converts teloxide messages into [`InboundEvent`]s, hands them to the
//! relay dispatcher and sends the reply back to the originating chat.

use async_trait::async_trait;
use log::{error, info, warn};
use relay_rs_core::commands::IMAGE_SEND_FAILED;
use relay_rs_core::{
    Command, Dispatcher as RelayDispatcher, InboundEvent, InboundPayload, MediaFetcher,
    PhotoVariant, RelayError, Reply,
};
use relay_rs_memory::UserId;
use std::path::Path;
use std::sync::Arc;
use teloxide::RequestError;
use teloxide::dispatching::ShutdownToken;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, FileId, InputFile, ParseMode, PhotoSize};

/// Downloads Telegram-hosted files through the bot API.
#[derive(Clone)]
pub struct TelegramMedia {
    bot: Bot,
}

impl TelegramMedia {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaFetcher for TelegramMedia {
    async fn download(&self, file_id: &str, destination: &Path) -> Result<(), RelayError> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|err| RelayError::Media(format!("get_file failed: {err}")))?;
        let mut dst = tokio::fs::File::create(destination).await?;
        if let Err(err) = self.bot.download_file(&file.path, &mut dst).await {
            drop(dst);
            let _ = tokio::fs::remove_file(destination).await;
            return Err(RelayError::Media(format!("download failed: {err}")));
        }
        Ok(())
    }
}

/// Register the command menu. Failures are logged only.
pub async fn register_commands(bot: &Bot) {
    let commands = Command::ALL
        .into_iter()
        .map(|command| BotCommand {
            command: command.name().into(),
            description: command.description().into(),
        })
        .collect::<Vec<_>>();
    if let Err(err) = bot.set_my_commands(commands).await {
        error!("failed to register bot commands: {err}");
    }
}

/// Poll Telegram until Ctrl-C or SIGTERM.
pub async fn run(bot: Bot, relay: Arc<RelayDispatcher>) {
    register_commands(&bot).await;

    let handler = Update::filter_message().endpoint(on_message);
    let mut dispatcher = Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(dptree::deps![relay])
        .enable_ctrlc_handler()
        .build();
    spawn_sigterm_listener(dispatcher.shutdown_token());

    info!("telegram polling started");
    dispatcher.dispatch().await;
    info!("telegram polling stopped");
}

async fn on_message(bot: Bot, msg: Message, relay: Arc<RelayDispatcher>) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let reply = relay.handle(inbound_event(&msg)).await;
    if let Err(err) = send_reply(&bot, chat_id, reply).await {
        error!("failed to send reply (chat_id={}): {err}", chat_id.0);
    }
    Ok(())
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    match reply {
        Reply::Text(text) => {
            bot.send_message(chat_id, text).await?;
        }
        Reply::Markdown(text) => {
            match bot
                .send_message(chat_id, text.clone())
                .parse_mode(ParseMode::Markdown)
                .await
            {
                Ok(_) => {}
                Err(RequestError::Api(err)) => {
                    warn!(
                        "markdown reply rejected, resending as plain text (chat_id={}): {err}",
                        chat_id.0
                    );
                    bot.send_message(chat_id, text).await?;
                }
                Err(err) => return Err(err),
            }
        }
        Reply::Photo { path, caption } => {
            if let Err(err) = bot
                .send_photo(chat_id, InputFile::file(path))
                .caption(caption)
                .await
            {
                warn!("photo upload failed (chat_id={}): {err}", chat_id.0);
                bot.send_message(chat_id, IMAGE_SEND_FAILED).await?;
            }
        }
    }
    Ok(())
}

/// Map a Telegram message to a transport-neutral event.
pub fn inbound_event(msg: &Message) -> InboundEvent {
    let (user_id, display_name) = match msg.from.as_ref() {
        Some(user) => (UserId(user.id.0 as i64), user.first_name.clone()),
        None => (UserId(msg.chat.id.0), String::new()),
    };
    let photos = msg
        .photo()
        .map(|sizes| sizes.iter().map(photo_variant).collect());
    InboundEvent {
        user_id,
        display_name,
        payload: classify(msg.text(), photos),
    }
}

fn photo_variant(size: &PhotoSize) -> PhotoVariant {
    PhotoVariant {
        file_id: size.file.id.0.clone(),
        width: size.width,
        height: size.height,
        file_size: Some(size.file.size),
    }
}

/// Photos win over text; anything else is unsupported.
fn classify(text: Option<&str>, photos: Option<Vec<PhotoVariant>>) -> InboundPayload {
    match (photos, text) {
        (Some(photos), _) => InboundPayload::Photo(photos),
        (None, Some(text)) => InboundPayload::Text(text.to_string()),
        (None, None) => InboundPayload::Unsupported,
    }
}

#[cfg(unix)]
fn spawn_sigterm_listener(token: ShutdownToken) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                warn!("failed to install SIGTERM handler: {err}");
                return;
            }
        };
        sigterm.recv().await;
        info!("received SIGTERM, shutting down");
        match token.shutdown() {
            Ok(wait) => wait.await,
            Err(err) => warn!("dispatcher was not running: {err}"),
        }
    });
}

#[cfg(not(unix))]
fn spawn_sigterm_listener(_token: ShutdownToken) {}
