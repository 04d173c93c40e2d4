//! Anthropic streaming
//!
//! Typed events: `message_start`, `content_block_delta`, `message_delta`, `message_stop`, plus
//! `ping` and `error`. The `type` field inside the data payload is authoritative.

use serde::Deserialize;

use super::error::{AnthropicErrorBody, AnthropicErrorMapper, PROVIDER_NAME};
use super::transformer::{AnthropicUsage, parse_stop_reason};
use crate::core::providers::base::sse::{SSEEvent, SSETransformer, StreamFrame};
use crate::core::providers::unified_provider::ProviderError;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicStreamEvent {
    MessageStart {
        message: MessageStartBody,
    },
    ContentBlockDelta {
        delta: ContentDelta,
    },
    MessageDelta {
        #[serde(default)]
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Option<AnthropicUsage>,
    },
    MessageStop,
    Error {
        error: AnthropicErrorBody,
    },
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Deserialize)]
struct MessageStartBody {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentDelta {
    #[serde(rename = "type", default)]
    delta_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageDeltaBody {
    #[serde(default)]
    stop_reason: Option<String>,
}

/// Maps Anthropic stream events to stream frames
#[derive(Debug, Clone)]
pub struct AnthropicStreamTransformer {
    mapper: AnthropicErrorMapper,
}

impl AnthropicStreamTransformer {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            mapper: AnthropicErrorMapper::new(model),
        }
    }
}

impl SSETransformer for AnthropicStreamTransformer {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn transform_event(&self, event: &SSEEvent) -> Result<Vec<StreamFrame>, ProviderError> {
        if event.data.trim().is_empty() {
            return Ok(Vec::new());
        }

        let parsed: AnthropicStreamEvent = serde_json::from_str(&event.data).map_err(|e| {
            ProviderError::response_parsing(PROVIDER_NAME, format!("invalid stream event: {}", e))
        })?;

        let frames = match parsed {
            AnthropicStreamEvent::MessageStart { message } => {
                let mut frames = Vec::with_capacity(2);
                if let Some(model) = message.model.filter(|model| !model.is_empty()) {
                    frames.push(StreamFrame::Model(model));
                }
                if let Some(usage) = message.usage {
                    frames.push(StreamFrame::Usage {
                        prompt_tokens: usage.input_tokens,
                        completion_tokens: usage.output_tokens,
                    });
                }
                frames
            }
            AnthropicStreamEvent::ContentBlockDelta { delta } => match delta.text {
                Some(text) if delta.delta_type == "text_delta" && !text.is_empty() => {
                    vec![StreamFrame::Delta(text)]
                }
                _ => Vec::new(),
            },
            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                let mut frames = Vec::with_capacity(2);
                if let Some(reason) = delta.stop_reason {
                    frames.push(StreamFrame::Finish(parse_stop_reason(&reason)));
                }
                if let Some(usage) = usage {
                    frames.push(StreamFrame::Usage {
                        prompt_tokens: usage.input_tokens,
                        completion_tokens: usage.output_tokens,
                    });
                }
                frames
            }
            AnthropicStreamEvent::MessageStop => vec![StreamFrame::Done],
            AnthropicStreamEvent::Error { error } => {
                return Err(self.mapper.from_stream_error(&error));
            }
            AnthropicStreamEvent::Ignored => Vec::new(),
        };

        Ok(frames)
    }
}
