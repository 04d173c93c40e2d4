//! SSE (Server-Sent Events) parsing
//!
//! Line framing is shared; what an event *means* is vendor specific and lives behind
//! [`SSETransformer`]. Transformers turn one complete event into zero or more [`StreamFrame`]s.

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::FinishReason;

/// Parsed SSE Event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SSEEvent {
    pub event_type: Option<String>,
    pub data: String,
    pub id: Option<String>,
    pub retry: Option<u64>,
}

impl SSEEvent {
    /// Parse SSE event from a line
    pub fn from_line(line: &str) -> Option<Self> {
        if line.is_empty() || line.starts_with(':') {
            return None;
        }

        let colon_pos = line.find(':')?;
        let field = &line[..colon_pos];
        let value = line[colon_pos + 1..].trim_start();

        match field {
            "data" => Some(SSEEvent {
                data: value.to_string(),
                ..Default::default()
            }),
            "event" => Some(SSEEvent {
                event_type: Some(value.to_string()),
                ..Default::default()
            }),
            "id" => Some(SSEEvent {
                id: Some(value.to_string()),
                ..Default::default()
            }),
            "retry" => value.parse::<u64>().ok().map(|retry_ms| SSEEvent {
                retry: Some(retry_ms),
                ..Default::default()
            }),
            _ => None,
        }
    }
}

/// Normalized unit of a vendor stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// Upstream announced the concrete model
    Model(String),
    /// Content delta
    Delta(String),
    /// Token counts; either side may be reported separately
    Usage {
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    /// Upstream reported why generation stopped
    Finish(FinishReason),
    /// End-of-stream marker
    Done,
}

/// Provider-specific SSE transformation
pub trait SSETransformer: Send + Sync {
    /// Provider name for error reporting
    fn provider_name(&self) -> &str;

    /// Transform one complete event
    fn transform_event(&self, event: &SSEEvent) -> Result<Vec<StreamFrame>, ProviderError>;
}

/// Incremental SSE parser
///
/// Bytes may arrive split anywhere, including inside a line or a UTF-8 sequence; incomplete
/// input is buffered until its line terminator arrives.
pub struct UnifiedSSEParser<T: SSETransformer> {
    transformer: T,
    buffer: Vec<u8>,
    current_event: Option<SSEEvent>,
}

impl<T: SSETransformer> UnifiedSSEParser<T> {
    /// Create new SSE parser with a transformer
    pub fn new(transformer: T) -> Self {
        Self {
            transformer,
            buffer: Vec::new(),
            current_event: None,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.transformer.provider_name()
    }

    /// Process raw bytes into frames
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Result<Vec<StreamFrame>, ProviderError> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let Some(last_newline) = self.buffer.iter().rposition(|b| *b == b'\n') else {
            return Ok(frames);
        };

        let complete: Vec<u8> = self.buffer.drain(..=last_newline).collect();
        let text = String::from_utf8_lossy(&complete);
        for line in text.lines() {
            frames.extend(self.process_line(line.trim_end_matches('\r'))?);
        }

        Ok(frames)
    }

    /// Dispatch whatever is still buffered once the body has ended
    pub fn finish(&mut self) -> Result<Vec<StreamFrame>, ProviderError> {
        let mut frames = Vec::new();
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let text = String::from_utf8_lossy(&rest).into_owned();
            frames.extend(self.process_line(text.trim_end_matches('\r'))?);
        }
        if let Some(event) = self.current_event.take() {
            frames.extend(self.process_event(event)?);
        }
        Ok(frames)
    }

    /// Process a single SSE line
    fn process_line(&mut self, line: &str) -> Result<Vec<StreamFrame>, ProviderError> {
        // Empty line signals end of event
        if line.is_empty() {
            return match self.current_event.take() {
                Some(event) => self.process_event(event),
                None => Ok(Vec::new()),
            };
        }

        let Some(event) = SSEEvent::from_line(line) else {
            return Ok(Vec::new());
        };
        let current = self.current_event.get_or_insert_with(SSEEvent::default);

        if !event.data.is_empty() {
            if !current.data.is_empty() {
                current.data.push('\n');
            }
            current.data.push_str(&event.data);
        }
        if event.event_type.is_some() {
            current.event_type = event.event_type;
        }
        if event.id.is_some() {
            current.id = event.id;
        }
        if event.retry.is_some() {
            current.retry = event.retry;
        }

        Ok(Vec::new())
    }

    fn process_event(&self, event: SSEEvent) -> Result<Vec<StreamFrame>, ProviderError> {
        if event.data.is_empty() && event.event_type.is_none() {
            return Ok(Vec::new());
        }
        self.transformer.transform_event(&event)
    }
}
