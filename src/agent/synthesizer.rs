use crate::agent::core::ModelCall;
use crate::agent::prompts;
use crate::error::Result;
use crate::models::InferenceResponse;
use tracing::debug;

/// Material the final answer is built from.
#[derive(Debug, Clone, Default)]
pub struct SynthesisInput<'a> {
    pub context: &'a str,
    pub history: &'a str,
    pub attachment: Option<&'a str>,
    pub question: &'a str,
}

pub struct Synthesizer {
    model: ModelCall,
}

impl Synthesizer {
    pub fn new(model: ModelCall) -> Self {
        Self { model }
    }

    /// Produce the final answer. Provider failures are returned to the
    /// caller as a failed turn.
    pub async fn synthesize(&self, system: &str, input: &SynthesisInput<'_>) -> Result<InferenceResponse> {
        let prompt = prompts::build_prompt(input.context, input.attachment, input.history, input.question);
        debug!(
            model = %self.model.model(),
            "Synthesizing answer from {} characters of context",
            input.context.len()
        );
        self.model.text(system, &prompt).await
    }
}
