//! Message handling pipeline for the relay.
//!
//! This crate owns prompt composition, reply generation, the inbound event
//! dispatcher and the slash-command handlers. It knows nothing about the
//! messaging transport: the binary converts platform updates into
//! [`InboundEvent`]s and sends back the returned [`Reply`].

pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod generator;
pub mod images;
pub mod llm;
pub mod media;
pub mod prompt;

pub use commands::{Command, CommandHandler};
pub use dispatcher::{Dispatcher, ImageSupport};
pub use error::RelayError;
pub use event::{InboundEvent, InboundPayload, PhotoVariant, Reply};
pub use generator::{ReplyGenerator, fallback_reply};
pub use images::ImageStore;
pub use llm::build_llm_provider;
pub use media::MediaFetcher;
pub use prompt::PromptComposer;
