//! Transport-neutral inbound events and outbound replies.

use relay_rs_memory::UserId;
use std::path::PathBuf;

/// One message received from the messaging platform.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Sender identifier.
    pub user_id: UserId,
    /// Sender display name.
    pub display_name: String,
    /// Message content.
    pub payload: InboundPayload,
}

impl InboundEvent {
    /// Text message event.
    pub fn text(user_id: UserId, display_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            payload: InboundPayload::Text(text.into()),
        }
    }

    /// Photo message event carrying every resolution the platform offers.
    pub fn photo(
        user_id: UserId,
        display_name: impl Into<String>,
        variants: Vec<PhotoVariant>,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            payload: InboundPayload::Photo(variants),
        }
    }

    /// Event for content the relay cannot process.
    pub fn unsupported(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            payload: InboundPayload::Unsupported,
        }
    }
}

/// Kinds of inbound content.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// Plain text, possibly a slash command.
    Text(String),
    /// Photo in one or more resolutions.
    Photo(Vec<PhotoVariant>),
    /// Anything else (stickers, voice, documents).
    Unsupported,
}

/// One resolution of an inbound photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVariant {
    /// Transport file identifier.
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: Option<u32>,
}

impl PhotoVariant {
    pub fn new(file_id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            file_id: file_id.into(),
            width,
            height,
            file_size: None,
        }
    }

    /// Pixel count used to rank resolutions.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Reply sent back to the originating chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Plain text.
    Text(String),
    /// Text using Markdown formatting.
    Markdown(String),
    /// Local photo with a caption.
    Photo { path: PathBuf, caption: String },
}

impl Reply {
    /// Text content or caption of the reply.
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(text) | Reply::Markdown(text) => text,
            Reply::Photo { caption, .. } => caption,
        }
    }
}
