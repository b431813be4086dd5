//! Test helpers shared across relay-rs crates.

pub mod llm;
pub mod sheets;

pub use llm::{FailingLLM, FixedChatResponse, RecordingChatLLM};
pub use sheets::{AppendMode, StubSheets};
