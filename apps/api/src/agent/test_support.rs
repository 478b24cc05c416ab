//! Scripted provider shared by orchestrator and router tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::pricing::{ModelPricing, TokenUsage};
use crate::llm_client::{LlmError, ProviderResponse, TextProvider};

/// Returns a fixed reply (or a fixed API failure) and records every prompt
/// it receives.
pub struct ScriptedProvider {
    reply: Result<String, (u16, String)>,
    usage: TokenUsage,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            usage: TokenUsage::new(1000, 1000),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            usage: TokenUsage::default(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.usage = TokenUsage::new(input_tokens, output_tokens);
        self
    }

    /// Uses `usage` verbatim, even if its total disagrees with its parts.
    pub fn with_raw_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(p, _)| p.clone())
    }

    pub fn last_max_tokens(&self) -> Option<u32> {
        self.calls.lock().unwrap().last().map(|(_, t)| *t)
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    async fn generate_response(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<ProviderResponse, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens));

        match &self.reply {
            Ok(text) => Ok(ProviderResponse {
                content: text.clone(),
                usage: self.usage,
                cost: ModelPricing::SONNET.cost(&self.usage),
            }),
            Err((status, message)) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
