//! LLM provider construction from relay configuration.

use crate::error::RelayError;
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::openai::OpenAI;
use autoagents_llm::builder::LLMBuilder;
use log::{info, warn};
use relay_rs_config::LlmConfig;
use std::sync::Arc;

/// Build the chat provider described by `config`.
///
/// Returns `Ok(None)` when no API key is configured; every reply then takes
/// the fallback path.
pub fn build_llm_provider(config: &LlmConfig) -> Result<Option<Arc<dyn LLMProvider>>, RelayError> {
    let Some(api_key) = config.api_key.clone() else {
        warn!("no LLM API key configured; replies will use the fallback text");
        return Ok(None);
    };
    info!(
        "building LLM provider (model={}, max_tokens={}, temperature={})",
        config.model, config.max_tokens, config.temperature
    );
    let llm: Arc<dyn LLMProvider> = LLMBuilder::<OpenAI>::new()
        .api_key(api_key)
        .model(config.model.clone())
        .max_tokens(config.max_tokens)
        .temperature(config.temperature)
        .build()
        .map_err(|err| RelayError::Llm(format!("failed to build OpenAI provider: {err}")))?;
    Ok(Some(llm))
}
