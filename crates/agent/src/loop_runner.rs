//! The query loop: ask the model, run the tools it requests, repeat until
//! it answers in text.

use crate::dispatch::Dispatcher;
use crate::prompt;
use chrono::Utc;
use skywatch_core::event::{DomainEvent, EventBus};
use skywatch_core::message::{Conversation, Message};
use skywatch_core::provider::{Provider, ProviderRequest};
use skywatch_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Orchestrates LLM calls and tool execution for one question at a time.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    dispatcher: Dispatcher,

    /// Maximum model turns that may request tools per question
    max_tool_rounds: usize,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,

    system_prompt: String,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            dispatcher: Dispatcher::new(tools, event_bus.clone()),
            max_tool_rounds: 10,
            event_bus,
            system_prompt: prompt::system_prompt(),
        }
    }

    /// Set the maximum number of tool-requesting model turns.
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer a question. Always returns text; a provider failure becomes
    /// the apology string.
    pub async fn answer(&self, question: &str) -> String {
        let mut conversation = Conversation::seeded(&self.system_prompt, question);
        match self.process(&mut conversation).await {
            Ok(text) => text,
            Err(e) => {
                error!(conversation_id = %conversation.id, error = %e, "Query failed");
                prompt::apology(e)
            }
        }
    }

    /// Drive the conversation until the model answers without tool calls.
    ///
    /// The conversation must already hold the system instruction and the
    /// user's question.
    pub async fn process(
        &self,
        conversation: &mut Conversation,
    ) -> Result<String, skywatch_core::Error> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            "Processing question"
        );

        let tool_definitions = self.dispatcher.tools().definitions();
        let mut tool_rounds = 0;
        let mut tokens_used = 0;
        let mut iteration = 0;

        loop {
            iteration += 1;
            debug!(conversation_id = %conversation.id, iteration, "Model turn");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;
            if let Some(usage) = &response.usage {
                tokens_used += usage.total_tokens;
            }

            if !response.wants_tools() {
                let text = response.message.content.clone();
                conversation.push(response.message);
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    conversation_id: conversation.id.to_string(),
                    model: response.model,
                    tokens_used,
                    timestamp: Utc::now(),
                });
                info!(conversation_id = %conversation.id, iteration, tool_rounds, "Answer ready");
                return Ok(text);
            }

            tool_rounds += 1;
            if tool_rounds > self.max_tool_rounds {
                warn!(
                    conversation_id = %conversation.id,
                    max_tool_rounds = self.max_tool_rounds,
                    "Tool round limit reached, giving up"
                );
                return Ok(prompt::ROUND_LIMIT.to_string());
            }

            debug!(
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );
            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for tc in &tool_calls {
                let content = self.dispatcher.dispatch(tc).await;
                conversation.push(Message::tool_result(&tc.id, content));
            }
        }
    }
}
