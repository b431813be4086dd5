//! Routes inbound events to the right handler.

use crate::commands::{Command, CommandHandler};
use crate::error::RelayError;
use crate::event::{InboundEvent, InboundPayload, PhotoVariant, Reply};
use crate::generator::ReplyGenerator;
use crate::images::ImageStore;
use crate::media::MediaFetcher;
use crate::prompt::PromptComposer;
use autoagents_llm::LLMProvider;
use log::{debug, error, info, warn};
use relay_rs_config::RelayConfig;
use relay_rs_memory::{ConversationMemory, MemoryWindowPolicy, UserId};
use relay_rs_sheets::{SheetRow, SheetStore};
use std::path::Path;
use std::sync::Arc;

pub const UNSUPPORTED_REPLY: &str = "Lo siento, solo puedo procesar texto e imágenes por ahora.";
pub const GENERIC_APOLOGY: &str = "Lo siento, ocurrió un error al procesar tu mensaje.";
pub const IMAGE_APOLOGY: &str = "Lo siento, hubo un error al procesar tu imagen.";

/// Photo storage and the transport download it needs.
#[derive(Clone)]
pub struct ImageSupport {
    pub store: ImageStore,
    pub fetcher: Arc<dyn MediaFetcher>,
}

/// Single pipeline for every inbound event.
///
/// Every event is logged to the sheet store before the reply is produced.
/// Logging failures are reported and never block the reply.
#[derive(Clone)]
pub struct Dispatcher {
    generator: ReplyGenerator,
    sheets: Arc<dyn SheetStore>,
    commands: CommandHandler,
    images: Option<ImageSupport>,
}

impl Dispatcher {
    /// Assemble a dispatcher around shared memory.
    pub fn new(
        generator: ReplyGenerator,
        sheets: Arc<dyn SheetStore>,
        images: Option<ImageSupport>,
        image_list_limit: usize,
    ) -> Self {
        let commands = CommandHandler::new(
            generator.memory().clone(),
            sheets.clone(),
            images.as_ref().map(|support| support.store.clone()),
            image_list_limit,
        );
        Self {
            generator,
            sheets,
            commands,
            images,
        }
    }

    /// Build every component from configuration.
    ///
    /// The image directory is created here when image support is enabled.
    pub fn from_config(
        config: &RelayConfig,
        llm: Option<Arc<dyn LLMProvider>>,
        sheets: Arc<dyn SheetStore>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Result<Self, RelayError> {
        let memory = Arc::new(ConversationMemory::new(MemoryWindowPolicy {
            max_records: config.memory.max_records,
            context_window: config.memory.context_window,
        }));
        let composer = PromptComposer::new()
            .with_additional_instructions(config.llm.additional_instructions.clone());
        let generator = ReplyGenerator::new(llm, memory, composer);
        let images = if config.images.enabled {
            Some(ImageSupport {
                store: ImageStore::open(&config.images.path)?,
                fetcher,
            })
        } else {
            info!("image storage disabled; photos are acknowledged by file id only");
            None
        };
        Ok(Self::new(
            generator,
            sheets,
            images,
            config.images.list_limit,
        ))
    }

    /// Shared conversation memory.
    pub fn memory(&self) -> &Arc<ConversationMemory> {
        self.generator.memory()
    }

    /// Handle one event. Never fails; errors become an apology reply.
    pub async fn handle(&self, event: InboundEvent) -> Reply {
        match self.route(&event).await {
            Ok(reply) => reply,
            Err(err) => {
                error!("failed to handle message (user_id={}): {err}", event.user_id);
                let apology = match err {
                    RelayError::Media(_) => IMAGE_APOLOGY,
                    _ => GENERIC_APOLOGY,
                };
                Reply::Text(apology.to_string())
            }
        }
    }

    async fn route(&self, event: &InboundEvent) -> Result<Reply, RelayError> {
        match &event.payload {
            InboundPayload::Text(text) => match Command::parse(text) {
                Some(command) => Ok(self.commands.handle(command, event.user_id).await),
                None => Ok(self.handle_text(event, text).await),
            },
            InboundPayload::Photo(variants) => self.handle_photo(event, variants).await,
            InboundPayload::Unsupported => {
                debug!("unsupported message (user_id={})", event.user_id);
                Ok(Reply::Text(UNSUPPORTED_REPLY.to_string()))
            }
        }
    }

    async fn handle_text(&self, event: &InboundEvent, text: &str) -> Reply {
        info!(
            "text message received (user_id={}, name={}, chars={})",
            event.user_id,
            event.display_name,
            text.chars().count()
        );
        debug!("text content (user_id={}): {text}", event.user_id);
        self.log_row(event.user_id, format!("TEXTO: {text}")).await;
        Reply::Text(self.generator.generate(text, event.user_id).await)
    }

    async fn handle_photo(
        &self,
        event: &InboundEvent,
        variants: &[PhotoVariant],
    ) -> Result<Reply, RelayError> {
        let Some(best) = largest_variant(variants) else {
            warn!("photo message without variants (user_id={})", event.user_id);
            return Ok(Reply::Text(UNSUPPORTED_REPLY.to_string()));
        };
        info!(
            "photo received (user_id={}, name={}, file_id={}, size={}x{})",
            event.user_id, event.display_name, best.file_id, best.width, best.height
        );

        let Some(support) = &self.images else {
            self.log_row(event.user_id, format!("IMAGEN: {}", best.file_id)).await;
            return Ok(Reply::Text(format!(
                "📸 ¡Imagen recibida!\n\n🆔 File ID: {}\n\n\
                 El almacenamiento de imágenes está desactivado, solo registré el identificador.",
                best.file_id
            )));
        };

        let destination = support
            .store
            .path_for(event.user_id, chrono::Utc::now().timestamp_millis());
        if let Err(err) = support.fetcher.download(&best.file_id, &destination).await {
            self.log_row(event.user_id, format!("IMAGEN: {}", best.file_id)).await;
            return Err(err);
        }
        info!(
            "photo stored (user_id={}, path={})",
            event.user_id,
            destination.display()
        );
        self.log_row(
            event.user_id,
            format!("IMAGEN: {} - {}", best.file_id, destination.display()),
        )
        .await;
        Ok(Reply::Text(photo_ack(&best.file_id, &destination)))
    }

    async fn log_row(&self, user_id: UserId, message: String) {
        match self.sheets.append(SheetRow::new(user_id, message)).await {
            Ok(outcome) => debug!(
                "message logged (user_id={user_id}, remote={})",
                outcome.is_remote()
            ),
            Err(err) => error!("failed to log message (user_id={user_id}): {err}"),
        }
    }
}

/// Highest resolution variant; later entries win ties.
fn largest_variant(variants: &[PhotoVariant]) -> Option<&PhotoVariant> {
    variants
        .iter()
        .max_by_key(|variant| (variant.area(), variant.file_size.unwrap_or(0)))
}

fn photo_ack(file_id: &str, destination: &Path) -> String {
    let file_name = destination
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    format!(
        "📸 ¡Imagen recibida! La guardé en mi sistema.\n\n\
         📁 Archivo: {file_name}\n\
         🆔 File ID: {file_id}\n\n\
         ¿Quieres que haga algo específico con esta imagen?"
    )
}
