//! OpenAI wire format
//!
//! Chat Completions request/response bodies and their conversion to and from the gateway types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::cost::calculate_cost;
use crate::core::types::{
    ChatRequest, ChatResponse, FinishReason, MessageRole, Usage, VisionRequest, VisionResponse,
};

#[derive(Debug, Serialize)]
pub(crate) struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAIMessage {
    pub role: &'static str,
    /// Plain string for text, part array for vision
    pub content: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl From<OpenAIUsage> for Usage {
    fn from(usage: OpenAIUsage) -> Self {
        Usage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

pub(crate) fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

pub(crate) fn transform_chat_request(
    request: &ChatRequest,
    model: &str,
    stream: bool,
) -> OpenAIChatRequest {
    let messages = request
        .messages
        .iter()
        .map(|message| OpenAIMessage {
            role: message.role.as_str(),
            content: Value::String(message.content.clone()),
        })
        .collect();

    OpenAIChatRequest {
        model: model.to_string(),
        messages,
        temperature: request.temperature,
        top_p: request.top_p,
        max_tokens: request.max_tokens,
        stop: request.stop.clone(),
        stream,
        stream_options: stream.then(|| json!({ "include_usage": true })),
    }
}

pub(crate) fn transform_vision_request(request: &VisionRequest, model: &str) -> OpenAIChatRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system_prompt) = &request.system_prompt {
        messages.push(OpenAIMessage {
            role: MessageRole::System.as_str(),
            content: Value::String(system_prompt.clone()),
        });
    }

    let mut parts = vec![json!({ "type": "text", "text": request.prompt })];
    parts.extend(request.images.iter().map(|image| {
        json!({ "type": "image_url", "image_url": { "url": image.to_data_url() } })
    }));
    messages.push(OpenAIMessage {
        role: MessageRole::User.as_str(),
        content: Value::Array(parts),
    });

    OpenAIChatRequest {
        model: model.to_string(),
        messages,
        temperature: request.temperature,
        top_p: None,
        max_tokens: request.max_tokens,
        stop: None,
        stream: false,
        stream_options: None,
    }
}

/// Fields shared by chat and vision responses
pub(crate) struct Completion {
    pub id: String,
    pub content: String,
    pub usage: Usage,
    pub cost: f64,
    pub model: String,
    pub finish_reason: FinishReason,
}

pub(crate) fn into_completion(response: OpenAIChatResponse, requested_model: &str) -> Completion {
    let model = response
        .model
        .filter(|model| !model.is_empty())
        .unwrap_or_else(|| requested_model.to_string());
    let usage = response.usage.map(Usage::from).unwrap_or_default();
    let (content, finish_reason) = response
        .choices
        .into_iter()
        .next()
        .map(|choice| {
            (
                choice.message.content.unwrap_or_default(),
                choice
                    .finish_reason
                    .as_deref()
                    .map(parse_finish_reason)
                    .unwrap_or_default(),
            )
        })
        .unwrap_or_default();

    Completion {
        id: response.id,
        content,
        cost: calculate_cost(&model, &usage),
        usage,
        model,
        finish_reason,
    }
}

impl Completion {
    pub fn into_chat_response(self, provider: &str, latency: Duration) -> ChatResponse {
        ChatResponse {
            id: self.id,
            content: self.content,
            usage: self.usage,
            cost: self.cost,
            provider: provider.to_string(),
            model: self.model,
            latency,
            finish_reason: self.finish_reason,
            metadata: Default::default(),
        }
    }

    pub fn into_vision_response(self, provider: &str, latency: Duration) -> VisionResponse {
        VisionResponse {
            id: self.id,
            content: self.content,
            usage: self.usage,
            cost: self.cost,
            provider: provider.to_string(),
            model: self.model,
            latency,
            finish_reason: self.finish_reason,
            metadata: Default::default(),
        }
    }
}
