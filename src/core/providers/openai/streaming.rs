//! OpenAI streaming
//!
//! `data:` events carry `chat.completion.chunk` objects; the stream ends with `data: [DONE]`.

use serde::Deserialize;

use super::error::{OpenAIErrorEnvelope, PROVIDER_NAME};
use super::transformer::{OpenAIUsage, parse_finish_reason};
use crate::core::providers::base::sse::{SSEEvent, SSETransformer, StreamFrame};
use crate::core::providers::unified_provider::ProviderError;

#[derive(Debug, Deserialize)]
struct OpenAIChunk {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAIChunkChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChunkChoice {
    #[serde(default)]
    delta: OpenAIDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Maps OpenAI chunk events to stream frames
#[derive(Debug, Clone, Default)]
pub struct OpenAIStreamTransformer;

impl SSETransformer for OpenAIStreamTransformer {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn transform_event(&self, event: &SSEEvent) -> Result<Vec<StreamFrame>, ProviderError> {
        let data = event.data.trim();
        if data == "[DONE]" {
            return Ok(vec![StreamFrame::Done]);
        }
        if data.is_empty() {
            return Ok(Vec::new());
        }

        if let Ok(envelope) = serde_json::from_str::<OpenAIErrorEnvelope>(data) {
            return Err(ProviderError::provider_unavailable(
                PROVIDER_NAME,
                format!("stream error: {}", envelope.error.message),
            ));
        }

        let chunk: OpenAIChunk = serde_json::from_str(data).map_err(|e| {
            ProviderError::response_parsing(PROVIDER_NAME, format!("invalid stream chunk: {}", e))
        })?;

        let mut frames = Vec::new();
        if let Some(model) = chunk.model.filter(|model| !model.is_empty()) {
            frames.push(StreamFrame::Model(model));
        }
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                frames.push(StreamFrame::Delta(content));
            }
            if let Some(reason) = choice.finish_reason {
                frames.push(StreamFrame::Finish(parse_finish_reason(&reason)));
            }
        }
        if let Some(usage) = chunk.usage {
            frames.push(StreamFrame::Usage {
                prompt_tokens: Some(usage.prompt_tokens),
                completion_tokens: Some(usage.completion_tokens),
            });
        }

        Ok(frames)
    }
}
