//! Base components shared by all providers

pub mod http;
pub mod sse;

pub use http::{PoolConfig, build_http_client, join_url};
pub use sse::{SSEEvent, SSETransformer, StreamFrame, UnifiedSSEParser};
