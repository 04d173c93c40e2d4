//! Anthropic Messages API wire format

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::cost::calculate_cost;
use crate::core::types::{
    ChatRequest, ChatResponse, FinishReason, ImageInput, MessageRole, Usage, VisionRequest,
    VisionResponse,
};

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicMessage {
    pub role: &'static str,
    pub content: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
}

pub(crate) fn parse_stop_reason(reason: &str) -> FinishReason {
    match reason {
        "end_turn" | "stop_sequence" => FinishReason::Stop,
        "max_tokens" => FinishReason::Length,
        "tool_use" => FinishReason::ToolCalls,
        "refusal" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

/// System messages move to the top-level `system` field
pub(crate) fn transform_chat_request(
    request: &ChatRequest,
    model: &str,
    default_max_tokens: u32,
    stream: bool,
) -> AnthropicRequest {
    let mut system_parts = Vec::new();
    let mut messages = Vec::with_capacity(request.messages.len());
    for message in &request.messages {
        match message.role {
            MessageRole::System => system_parts.push(message.content.as_str()),
            role => messages.push(AnthropicMessage {
                role: role.as_str(),
                content: Value::String(message.content.clone()),
            }),
        }
    }

    AnthropicRequest {
        model: model.to_string(),
        max_tokens: request.max_tokens.unwrap_or(default_max_tokens),
        messages,
        system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
        temperature: request.temperature,
        top_p: request.top_p,
        stop_sequences: request.stop.clone(),
        stream,
    }
}

fn image_block(image: &ImageInput) -> Value {
    match image {
        ImageInput::Base64 { media_type, data } => json!({
            "type": "image",
            "source": { "type": "base64", "media_type": media_type, "data": data }
        }),
        ImageInput::Url { url } => json!({
            "type": "image",
            "source": { "type": "url", "url": url }
        }),
    }
}

/// Images first, then the prompt text
pub(crate) fn transform_vision_request(
    request: &VisionRequest,
    model: &str,
    default_max_tokens: u32,
) -> AnthropicRequest {
    let mut blocks: Vec<Value> = request.images.iter().map(image_block).collect();
    blocks.push(json!({ "type": "text", "text": request.prompt }));

    AnthropicRequest {
        model: model.to_string(),
        max_tokens: request.max_tokens.unwrap_or(default_max_tokens),
        messages: vec![AnthropicMessage {
            role: MessageRole::User.as_str(),
            content: Value::Array(blocks),
        }],
        system: request.system_prompt.clone(),
        temperature: request.temperature,
        top_p: None,
        stop_sequences: None,
        stream: false,
    }
}

pub(crate) struct Completion {
    pub id: String,
    pub content: String,
    pub usage: Usage,
    pub cost: f64,
    pub model: String,
    pub finish_reason: FinishReason,
}

pub(crate) fn into_completion(response: AnthropicResponse, requested_model: &str) -> Completion {
    let model = response
        .model
        .filter(|model| !model.is_empty())
        .unwrap_or_else(|| requested_model.to_string());
    let content = response
        .content
        .iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join("");
    let usage = response
        .usage
        .map(|usage| {
            Usage::new(
                usage.input_tokens.unwrap_or(0),
                usage.output_tokens.unwrap_or(0),
            )
        })
        .unwrap_or_default();

    Completion {
        id: response.id,
        content,
        cost: calculate_cost(&model, &usage),
        usage,
        finish_reason: response
            .stop_reason
            .as_deref()
            .map(parse_stop_reason)
            .unwrap_or_default(),
        model,
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
