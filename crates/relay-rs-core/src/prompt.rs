//! System prompt assembly for each generated reply.

/// Opening line of every system prompt.
const PERSONA: &str = "Eres un agente de AI que usa herramientas.";

/// Capabilities advertised to the model after the conversation context.
const CAPABILITIES: &str = "Tienes acceso a las siguientes herramientas:\n\
1. Google Sheets - Puedes consultar datos de hojas de cálculo\n\
2. Memoria de conversación - Recuerdas el contexto de la conversación\n\
\n\
Responde de manera útil y profesional. Si necesitas usar Google Sheets, \
menciona que puedes acceder a esa información.";

/// Builds the system prompt from the rendered memory context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptComposer {
    additional_instructions: Option<String>,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append operator-provided instructions after the capability list.
    pub fn with_additional_instructions(mut self, instructions: Option<String>) -> Self {
        self.additional_instructions = instructions
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    /// Compose the system prompt. The context is embedded verbatim.
    pub fn compose(&self, memory_context: &str) -> String {
        let mut prompt = format!("{PERSONA} {memory_context}\n\n{CAPABILITIES}");
        if let Some(extra) = &self.additional_instructions {
            prompt.push_str("\n\n");
            prompt.push_str(extra);
        }
        prompt
    }
}
