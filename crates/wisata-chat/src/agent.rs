//! Tool-calling agent over the language model.

use std::sync::Arc;

use tracing::{debug, warn};
use wisata_provider::{ContentBlock, LanguageModel, LlmMessage, LlmRequest};

use crate::error::ChatError;
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::ChatEntry;

const SYSTEM_PROMPT: &str = "Kamu adalah asisten perjalanan. Gunakan tool yang tersedia untuk \
menjawab pertanyaan tentang transportasi, promo, destinasi wisata, dan hotel. Jawab dalam bahasa \
Indonesia. Jika kamu tidak tahu jawabannya, balas persis dengan \"I don't know\".";

/// Runs prompt -> tool calls -> tool results rounds until the model answers
/// in text.
pub struct ToolAgent {
    model: Arc<dyn LanguageModel>,
    tools: ToolRegistry,
    context: ToolContext,
    max_iterations: usize,
    memory_turns: usize,
}

impl ToolAgent {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tools: ToolRegistry,
        context: ToolContext,
        max_iterations: usize,
        memory_turns: usize,
    ) -> Self {
        Self {
            model,
            tools,
            context,
            max_iterations,
            memory_turns,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Conversational memory: the last `memory_turns` user/bot exchanges of
    /// `history` as chat messages. Tables are left out.
    pub fn memory(&self, history: &[ChatEntry]) -> Vec<LlmMessage> {
        let messages: Vec<LlmMessage> = history
            .iter()
            .filter_map(|entry| match entry {
                ChatEntry::User(text) => Some(LlmMessage::user(text.clone())),
                ChatEntry::Bot(text) => Some(LlmMessage::assistant(text.clone())),
                ChatEntry::Table(_) => None,
            })
            .collect();
        let keep = self.memory_turns * 2;
        let skip = messages.len().saturating_sub(keep);
        messages.into_iter().skip(skip).collect()
    }

    /// Answer `prompt` given prior `memory`, letting the model call tools.
    ///
    /// After `max_iterations` tool rounds one last request is sent without
    /// tools so the model has to answer in text.
    pub async fn run(
        &self,
        prompt: &str,
        memory: Vec<LlmMessage>,
        last_city: Option<&str>,
    ) -> Result<String, ChatError> {
        let mut messages = memory;
        messages.push(LlmMessage::user(prompt));
        let tool_defs = self.tools.definitions();

        for iteration in 0..self.max_iterations {
            let req = LlmRequest {
                system: Some(SYSTEM_PROMPT.to_string()),
                messages: messages.clone(),
                tools: tool_defs.clone(),
                ..LlmRequest::default()
            };
            let resp = self.model.chat(req).await?;

            if !resp.has_tool_uses() {
                return Ok(resp.text.trim().to_string());
            }

            let calls: Vec<(String, String, String)> = resp
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), raw_argument(input)))
                .collect();

            messages.push(LlmMessage {
                role: "assistant".to_string(),
                content: resp.content.clone(),
            });

            let mut results = Vec::with_capacity(calls.len());
            for (id, name, raw) in calls {
                debug!(iteration, tool = %name, arg = %raw, "agent tool call");
                let content = match self
                    .tools
                    .invoke(&name, &raw, last_city, &self.context)
                    .await
                {
                    Ok(output) => output,
                    Err(e) => format!("Tool execution error: {e}"),
                };
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id,
                    name,
                    content,
                });
            }
            messages.push(LlmMessage {
                role: "user".to_string(),
                content: results,
            });
        }

        warn!(
            max_iterations = self.max_iterations,
            "agent exhausted tool rounds, requesting final answer without tools"
        );
        let final_req = LlmRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            messages,
            ..LlmRequest::default()
        };
        let resp = self.model.chat(final_req).await?;
        Ok(resp.text.trim().to_string())
    }
}

/// Tool arguments reach the tools as one string: bare strings as-is,
/// anything else as JSON.
fn raw_argument(input: &serde_json::Value) -> String {
    match input {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
