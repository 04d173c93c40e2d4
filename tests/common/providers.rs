//! Mock upstream servers
//!
//! Real providers are pointed at `wiremock` servers that speak the vendor wire formats.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use llm_gateway::{AnthropicConfig, AnthropicProvider, OpenAIConfig, OpenAIProvider};

pub const OPENAI_KEY: &str = "sk-test-openai";
pub const ANTHROPIC_KEY: &str = "sk-ant-test";
pub const OPENAI_CHAT_PATH: &str = "/v1/chat/completions";
pub const ANTHROPIC_MESSAGES_PATH: &str = "/v1/messages";

/// Mock of the OpenAI Chat Completions API
pub struct MockOpenAI {
    pub server: MockServer,
}

impl MockOpenAI {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> OpenAIConfig {
        OpenAIConfig::new(OPENAI_KEY)
            .with_base_url(format!("{}/v1", self.server.uri()))
            .with_timeout(Duration::from_secs(5))
    }

    pub fn provider(&self) -> OpenAIProvider {
        OpenAIProvider::new(self.config()).expect("valid OpenAI config")
    }

    /// Answer every chat call with `status` and a JSON body
    pub async fn respond_with(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(OPENAI_CHAT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer every chat call with an SSE body
    pub async fn stream_with(&self, body: String) {
        Mock::given(method("POST"))
            .and(path(OPENAI_CHAT_PATH))
            .respond_with(sse(body))
            .mount(&self.server)
            .await;
    }
}

/// Mock of the Anthropic Messages API
pub struct MockAnthropic {
    pub server: MockServer,
}

impl MockAnthropic {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> AnthropicConfig {
        AnthropicConfig::new(ANTHROPIC_KEY)
            .with_base_url(self.server.uri())
            .with_timeout(Duration::from_secs(5))
    }

    pub fn provider(&self) -> AnthropicProvider {
        AnthropicProvider::new(self.config()).expect("valid Anthropic config")
    }

    pub async fn respond_with(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_MESSAGES_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn stream_with(&self, body: String) {
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_MESSAGES_PATH))
            .respond_with(sse(body))
            .mount(&self.server)
            .await;
    }
}

pub fn sse(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream")
}

pub fn openai_chat_body(content: &str, prompt_tokens: u32, completion_tokens: u32) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

pub fn openai_error_body(message: &str, error_type: &str, code: Option<&str>) -> Value {
    json!({"error": {"message": message, "type": error_type, "code": code}})
}

/// SSE body with one chunk per delta; `done` appends the usage chunk and `[DONE]`
pub fn openai_sse(deltas: &[&str], done: bool) -> String {
    let mut body = String::new();
    for delta in deltas {
        let chunk = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "delta": {"content": delta}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    if done {
        let finish = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
        });
        let usage = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        });
        body.push_str(&format!("data: {}\n\ndata: {}\n\ndata: [DONE]\n\n", finish, usage));
    }
    body
}

pub fn anthropic_message_body(content: &str, input_tokens: u32, output_tokens: u32) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-haiku-20241022",
        "content": [{"type": "text", "text": content}],
        "stop_reason": "end_turn",
        "stop_sequence": null,
        "usage": {"input_tokens": input_tokens, "output_tokens": output_tokens}
    })
}

pub fn anthropic_error_body(error_type: &str, message: &str) -> Value {
    json!({"type": "error", "error": {"type": error_type, "message": message}})
}

fn anthropic_event(name: &str, data: Value) -> String {
    format!("event: {}\ndata: {}\n\n", name, data)
}

/// Typed event stream; `done` closes the message properly
pub fn anthropic_sse(deltas: &[&str], done: bool) -> String {
    let mut body = anthropic_event(
        "message_start",
        json!({
            "type": "message_start",
            "message": {
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "model": "claude-3-5-haiku-20241022",
                "content": [],
                "usage": {"input_tokens": 20, "output_tokens": 1}
            }
        }),
    );
    body.push_str(&anthropic_event(
        "content_block_start",
        json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
    ));
    body.push_str(&anthropic_event("ping", json!({"type": "ping"})));
    for delta in deltas {
        body.push_str(&anthropic_event(
            "content_block_delta",
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": delta}}),
        ));
    }
    if done {
        body.push_str(&anthropic_event(
            "content_block_stop",
            json!({"type": "content_block_stop", "index": 0}),
        ));
        body.push_str(&anthropic_event(
            "message_delta",
            json!({"type": "message_delta", "delta": {"stop_reason": "end_turn", "stop_sequence": null}, "usage": {"output_tokens": 9}}),
        ));
        body.push_str(&anthropic_event(
            "message_stop",
            json!({"type": "message_stop"}),
        ));
    }
    body
}
