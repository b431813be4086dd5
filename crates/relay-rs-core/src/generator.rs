//! Reply generation backed by the conversation memory.

use crate::error::RelayError;
use crate::prompt::PromptComposer;
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, MessageType};
use log::{debug, error};
use relay_rs_memory::{ConversationMemory, MemoryRole, UserId};
use std::sync::Arc;

/// Reply used whenever the model is unreachable. Always quotes the message.
pub fn fallback_reply(message: &str) -> String {
    format!(
        "Recibí tu mensaje: \"{message}\"\n\n\
         🤖 La IA no está disponible en este momento. Inténtalo de nuevo más tarde."
    )
}

/// Produces assistant replies and records both sides of the exchange.
#[derive(Clone)]
pub struct ReplyGenerator {
    llm: Option<Arc<dyn LLMProvider>>,
    memory: Arc<ConversationMemory>,
    composer: PromptComposer,
}

impl ReplyGenerator {
    /// Create a generator. Without a provider every reply is the fallback.
    pub fn new(
        llm: Option<Arc<dyn LLMProvider>>,
        memory: Arc<ConversationMemory>,
        composer: PromptComposer,
    ) -> Self {
        Self {
            llm,
            memory,
            composer,
        }
    }

    /// Shared memory the generator writes to.
    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    /// Generate a reply for `message`.
    ///
    /// The user turn is remembered before the call. The assistant turn is
    /// remembered only when the model answered; failures yield
    /// [`fallback_reply`] and are never surfaced to the caller.
    pub async fn generate(&self, message: &str, user_id: UserId) -> String {
        self.memory.append(user_id, MemoryRole::User, message);
        let system_prompt = self.composer.compose(&self.memory.render_context(user_id));

        match self.complete(&system_prompt, message).await {
            Ok(reply) => {
                self.memory.append(user_id, MemoryRole::Assistant, reply.clone());
                debug!(
                    "reply generated (user_id={}, chars={})",
                    user_id,
                    reply.chars().count()
                );
                reply
            }
            Err(err) => {
                error!("reply generation failed (user_id={user_id}): {err}");
                fallback_reply(message)
            }
        }
    }

    async fn complete(&self, system_prompt: &str, message: &str) -> Result<String, RelayError> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| RelayError::Llm("no provider configured".to_string()))?;
        let messages = [
            ChatMessage {
                role: ChatRole::System,
                message_type: MessageType::Text,
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                message_type: MessageType::Text,
                content: message.to_string(),
            },
        ];
        let response: Box<dyn ChatResponse> = llm
            .chat_with_tools(&messages, None, None)
            .await
            .map_err(|err| RelayError::Llm(err.to_string()))?;
        response
            .text()
            .ok_or_else(|| RelayError::Llm("response carried no text".to_string()))
    }
}
