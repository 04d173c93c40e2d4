//! Anthropic provider against a mock Messages API

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    use crate::common::assertions::split_stream;
    use crate::common::providers::*;
    use llm_gateway::{
        ChatMessage, ChatRequest, ChatStreamResponse, FinishReason, ImageInput, Provider,
        ProviderError, RequestContext, VisionRequest,
    };

    async fn drain(mut receiver: mpsc::Receiver<ChatStreamResponse>) -> Vec<ChatStreamResponse> {
        let mut elements = Vec::new();
        while let Some(element) = receiver.recv().await {
            elements.push(element);
        }
        elements
    }

    #[tokio::test]
    async fn test_chat_sends_vendor_headers_and_lifts_system() {
        let upstream = MockAnthropic::start().await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_MESSAGES_PATH))
            .and(header("x-api-key", ANTHROPIC_KEY))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "model": "claude-3-5-haiku-20241022",
                "max_tokens": 4096,
                "system": "Be brief.",
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(anthropic_message_body("Hi.", 1000, 100)),
            )
            .expect(1)
            .mount(&upstream.server)
            .await;

        let request = ChatRequest::new(vec![
            ChatMessage::system("Be brief."),
            ChatMessage::user("Hello"),
        ]);
        let response = upstream
            .provider()
            .chat(request, &RequestContext::new())
            .await
            .unwrap();

        assert_eq!(response.content, "Hi.");
        assert_eq!(response.provider, "anthropic");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.total_tokens, 1100);
        // 1000 * 0.8 / 1M + 100 * 4.0 / 1M
        crate::assert_approx_eq!(response.cost, 0.0012);
    }

    #[tokio::test]
    async fn test_typed_error_classification() {
        let cases = [
            (401, "authentication_error", "invalid x-api-key", "invalid_api_key"),
            (
                400,
                "invalid_request_error",
                "prompt is too long: 210000 tokens > 200000 maximum",
                "context_length_exceeded",
            ),
            (400, "invalid_request_error", "max_tokens: field required", "invalid_request"),
            (404, "not_found_error", "model: claude-9", "model_not_supported"),
            (429, "rate_limit_error", "Number of requests exceeded", "rate_limit_exceeded"),
            (529, "overloaded_error", "Overloaded", "provider_unavailable"),
        ];

        for (status, error_type, message, expected) in cases {
            let upstream = MockAnthropic::start().await;
            upstream
                .respond_with(status, anthropic_error_body(error_type, message))
                .await;

            let err = upstream
                .provider()
                .chat(
                    ChatRequest::new(vec![ChatMessage::user("Hello")]),
                    &RequestContext::new(),
                )
                .await
                .unwrap_err();
            assert_eq!(err.error_type(), expected, "{error_type}");
        }
    }

    #[tokio::test]
    async fn test_overloaded_is_retryable_context_overflow_is_not() {
        let upstream = MockAnthropic::start().await;
        upstream
            .respond_with(529, anthropic_error_body("overloaded_error", "Overloaded"))
            .await;
        let err = upstream
            .provider()
            .chat(
                ChatRequest::new(vec![ChatMessage::user("Hello")]),
                &RequestContext::new(),
            )
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let upstream = MockAnthropic::start().await;
        upstream
            .respond_with(
                400,
                anthropic_error_body("invalid_request_error", "prompt is too long"),
            )
            .await;
        let err = upstream
            .provider()
            .chat(
                ChatRequest::new(vec![ChatMessage::user("Hello")]),
                &RequestContext::new(),
            )
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_stream_success() {
        let upstream = MockAnthropic::start().await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_MESSAGES_PATH))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(sse(anthropic_sse(&["Bon", "jour"], true)))
            .expect(1)
            .mount(&upstream.server)
            .await;

        let (sender, receiver) = mpsc::channel(16);
        let summary = upstream
            .provider()
            .chat_stream(
                ChatRequest::new(vec![ChatMessage::user("Say hello in French")]),
                &RequestContext::new(),
                sender,
            )
            .await
            .unwrap();
        let elements = drain(receiver).await;
        let (content, terminals) = split_stream(&elements);

        assert_eq!(content, "Bonjour");
        assert_eq!(terminals.len(), 1);
        assert!(!terminals[0].is_error());
        assert_eq!(terminals[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.usage.map(|u| (u.prompt_tokens, u.completion_tokens)), Some((20, 9)));
        assert_eq!(summary.model, "claude-3-5-haiku-20241022");
    }

    #[tokio::test]
    async fn test_stream_error_event_terminates_with_error() {
        let upstream = MockAnthropic::start().await;
        let mut body = anthropic_sse(&["partial"], false);
        body.push_str(&format!(
            "event: error\ndata: {}\n\n",
            anthropic_error_body("overloaded_error", "Overloaded")
        ));
        upstream.stream_with(body).await;

        let (sender, receiver) = mpsc::channel(16);
        let err = upstream
            .provider()
            .chat_stream(
                ChatRequest::new(vec![ChatMessage::user("Hello")]),
                &RequestContext::new(),
                sender,
            )
            .await
            .unwrap_err();
        let elements = drain(receiver).await;
        let (content, terminals) = split_stream(&elements);

        assert_eq!(content, "partial");
        assert_eq!(terminals.len(), 1);
        assert!(matches!(
            terminals[0].error,
            Some(ProviderError::ProviderUnavailable { .. })
        ));
        assert!(matches!(err, ProviderError::ProviderUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_vision_sends_base64_source() {
        let upstream = MockAnthropic::start().await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_MESSAGES_PATH))
            .and(body_partial_json(json!({
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "image", "source": {"type": "base64", "media_type": "image/png"}},
                        {"type": "text", "text": "Describe it"}
                    ]
                }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(anthropic_message_body("A square.", 400, 4)),
            )
            .expect(1)
            .mount(&upstream.server)
            .await;

        let request = VisionRequest::new(
            "Describe it",
            vec![ImageInput::from_bytes("image/png", b"\x89PNG fake")],
        );
        let response = upstream
            .provider()
            .analyze(request, &RequestContext::new())
            .await
            .unwrap();

        assert_eq!(response.content, "A square.");
    }

    #[tokio::test]
    async fn test_health_probe() {
        let upstream = MockAnthropic::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("x-api-key", ANTHROPIC_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&upstream.server)
            .await;

        let provider = upstream.provider();
        assert!(provider.is_healthy(&RequestContext::new()).await);
        provider.close().await.unwrap();
        assert!(!provider.is_healthy(&RequestContext::new()).await);
    }
}
