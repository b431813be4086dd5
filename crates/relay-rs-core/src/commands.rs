//! Slash-command parsing and handlers.

use crate::event::Reply;
use crate::images::ImageStore;
use log::{error, info};
use relay_rs_memory::{ConversationMemory, UserId};
use relay_rs_sheets::SheetStore;
use std::collections::HashSet;
use std::sync::Arc;

/// Rows shown by `/sheets`.
const SHEET_PREVIEW_ROWS: usize = 10;

pub const GREETING: &str =
    "¡Hola! Soy un agente de AI que puede ayudarte con herramientas. ¿En qué puedo asistirte?";
pub const MEMORY_CLEARED: &str = "Memoria del agente limpiada.";
pub const NO_MESSAGES: &str = "No hay mensajes guardados aún.";
pub const SHEETS_UNAVAILABLE: &str =
    "No hay mensajes disponibles: error accediendo a Google Sheets. Verifica la configuración.";
pub const NO_IMAGES: &str =
    "📸 No hay imágenes guardadas aún.\n\nEnvía una imagen para que la guarde!";
pub const NO_IMAGE_TO_SEND: &str = "📸 No hay imágenes disponibles para enviar.";
pub const IMAGES_DISABLED: &str = "📸 El almacenamiento de imágenes está desactivado.";
pub const IMAGE_LIST_FAILED: &str = "Error obteniendo lista de imágenes.";
pub const IMAGE_SEND_FAILED: &str = "Error enviando la imagen.";

/// Commands understood by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Help,
    Clear,
    Sheets,
    Stats,
    Images,
    SendImage,
}

impl Command {
    /// Every command in menu order.
    pub const ALL: [Command; 7] = [
        Command::Start,
        Command::Help,
        Command::Clear,
        Command::Sheets,
        Command::Stats,
        Command::Images,
        Command::SendImage,
    ];

    /// Parse `/name`, `/name@bot` or `/name args`. Unknown names yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let head = text.split_whitespace().next()?;
        let name = head.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _)| name);
        Self::ALL
            .into_iter()
            .find(|command| command.name() == name)
    }

    /// Name without the leading slash.
    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Clear => "clear",
            Command::Sheets => "sheets",
            Command::Stats => "stats",
            Command::Images => "images",
            Command::SendImage => "sendimage",
        }
    }

    /// Menu description.
    pub fn description(self) -> &'static str {
        match self {
            Command::Start => "Iniciar conversación",
            Command::Help => "Mostrar ayuda",
            Command::Clear => "Limpiar memoria del agente",
            Command::Sheets => "Ver mensajes guardados en Google Sheets",
            Command::Stats => "Ver estadísticas del bot",
            Command::Images => "Ver imágenes guardadas",
            Command::SendImage => "Enviar una imagen guardada",
        }
    }
}

/// Aggregates computed from the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetStats {
    pub total_rows: usize,
    pub unique_users: usize,
}

impl SheetStats {
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let unique_users = rows
            .iter()
            .filter_map(|row| row.first())
            .collect::<HashSet<_>>()
            .len();
        Self {
            total_rows: rows.len(),
            unique_users,
        }
    }
}

/// Runs commands against memory, the message log and the image store.
#[derive(Clone)]
pub struct CommandHandler {
    memory: Arc<ConversationMemory>,
    sheets: Arc<dyn SheetStore>,
    images: Option<ImageStore>,
    image_list_limit: usize,
}

impl CommandHandler {
    /// `images` is `None` when image support is disabled.
    pub fn new(
        memory: Arc<ConversationMemory>,
        sheets: Arc<dyn SheetStore>,
        images: Option<ImageStore>,
        image_list_limit: usize,
    ) -> Self {
        Self {
            memory,
            sheets,
            images,
            image_list_limit,
        }
    }

    /// Run `command` for `user_id`. Failures become reply text.
    pub async fn handle(&self, command: Command, user_id: UserId) -> Reply {
        info!("command received (command={}, user_id={user_id})", command.name());
        match command {
            Command::Start => Reply::Text(GREETING.to_string()),
            Command::Help => Reply::Markdown(render_help(self.images.is_some())),
            Command::Clear => {
                self.memory.clear(user_id);
                Reply::Text(MEMORY_CLEARED.to_string())
            }
            Command::Sheets => self.sheets_preview().await,
            Command::Stats => self.stats(user_id).await,
            Command::Images => self.image_list(),
            Command::SendImage => self.first_image(),
        }
    }

    async fn sheets_preview(&self) -> Reply {
        match self.sheets.read().await {
            Ok(rows) => match render_sheet_rows(&rows) {
                Some(text) => Reply::Markdown(text),
                None => Reply::Text(NO_MESSAGES.to_string()),
            },
            Err(err) => {
                error!("failed to read message log: {err}");
                Reply::Text(SHEETS_UNAVAILABLE.to_string())
            }
        }
    }

    async fn stats(&self, user_id: UserId) -> Reply {
        let stats = match self.sheets.read().await {
            Ok(rows) => Some(SheetStats::from_rows(&rows)),
            Err(err) => {
                error!("failed to read message log for stats: {err}");
                None
            }
        };
        Reply::Markdown(render_stats(stats, self.memory.len(user_id)))
    }

    fn image_list(&self) -> Reply {
        let Some(store) = &self.images else {
            return Reply::Text(IMAGES_DISABLED.to_string());
        };
        match store.list() {
            Ok(names) if names.is_empty() => Reply::Text(NO_IMAGES.to_string()),
            Ok(names) => Reply::Markdown(render_image_list(&names, self.image_list_limit)),
            Err(err) => {
                error!("failed to list images (path={}): {err}", store.root().display());
                Reply::Text(IMAGE_LIST_FAILED.to_string())
            }
        }
    }

    fn first_image(&self) -> Reply {
        let Some(store) = &self.images else {
            return Reply::Text(IMAGES_DISABLED.to_string());
        };
        match store.first() {
            Ok(Some((name, path))) => Reply::Photo {
                caption: format!(
                    "📸 Imagen desde el servidor: {name}\n\n¡Esta imagen está guardada en el bot!"
                ),
                path,
            },
            Ok(None) => Reply::Text(NO_IMAGE_TO_SEND.to_string()),
            Err(err) => {
                error!("failed to pick image (path={}): {err}", store.root().display());
                Reply::Text(IMAGE_SEND_FAILED.to_string())
            }
        }
    }
}

/// Help text listing every command and capability.
pub fn render_help(images_enabled: bool) -> String {
    let mut text = String::from("🤖 *Comandos disponibles:*\n\n");
    for command in Command::ALL {
        text.push_str(&format!("/{} - {}\n", command.name(), command.description()));
    }
    text.push_str("\n*Capacidades:*\n");
    text.push_str("💬 Conversación con memoria de contexto\n");
    text.push_str("📊 Registro de mensajes en Google Sheets\n");
    if images_enabled {
        text.push_str("📸 Recepción y almacenamiento de imágenes\n");
    } else {
        text.push_str("📸 Recepción de imágenes (sin almacenamiento)\n");
    }
    text
}

/// Numbered preview of the first rows; `None` when nothing is renderable.
///
/// Rows missing either cell are skipped but keep their position number.
pub fn render_sheet_rows(rows: &[Vec<String>]) -> Option<String> {
    let entries = rows
        .iter()
        .take(SHEET_PREVIEW_ROWS)
        .enumerate()
        .filter_map(|(index, row)| match (row.first(), row.get(1)) {
            (Some(user), Some(message)) if !user.is_empty() && !message.is_empty() => Some(
                format!("{}. Usuario: {user}\n   Mensaje: {message}\n\n", index + 1),
            ),
            _ => None,
        })
        .collect::<Vec<_>>();
    if entries.is_empty() {
        return None;
    }
    Some(format!(
        "📊 *Mensajes guardados en Google Sheets:*\n\n{}",
        entries.concat()
    ))
}

/// Statistics summary. Missing sheet figures are shown as unavailable.
pub fn render_stats(stats: Option<SheetStats>, memory_records: usize) -> String {
    let (total, unique) = match stats {
        Some(stats) => (stats.total_rows.to_string(), stats.unique_users.to_string()),
        None => ("no disponible".to_string(), "no disponible".to_string()),
    };
    format!(
        "📈 *Estadísticas del Bot:*\n\n\
         💬 Total de mensajes: {total}\n\
         👥 Usuarios únicos: {unique}\n\
         🧠 Memoria del agente: {memory_records} mensajes"
    )
}

/// Image names up to `limit`, with a remainder line.
pub fn render_image_list(names: &[String], limit: usize) -> String {
    let mut text = format!("📸 *Imágenes guardadas ({}):*\n\n", names.len());
    for (index, name) in names.iter().take(limit).enumerate() {
        text.push_str(&format!("{}. {name}\n", index + 1));
    }
    if names.len() > limit {
        text.push_str(&format!("\n... y {} más", names.len() - limit));
    }
    text
}
