//! Manager routing over real providers and mock upstreams

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    use crate::common::assertions::{ChatResponseAssertions, expect_all_failed, split_stream};
    use crate::common::fast_manager_config;
    use crate::common::providers::*;
    use llm_gateway::{
        ChatMessage, ChatRequest, GatewayConfig, GatewayError, Manager, Provider, ProviderError,
        RequestContext,
    };

    fn hello() -> ChatRequest {
        ChatRequest::new(vec![ChatMessage::user("Hello")])
    }

    fn manager(openai: &MockOpenAI, anthropic: &MockAnthropic, fallback: bool) -> Manager {
        let providers: Vec<Arc<dyn Provider>> =
            vec![Arc::new(openai.provider()), Arc::new(anthropic.provider())];
        Manager::new(fast_manager_config().with_fallback(fallback), providers).unwrap()
    }

    #[tokio::test]
    async fn test_default_provider_serves_and_is_billed() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_chat_body("Hi", 100, 20)))
            .expect(2)
            .mount(&openai.server)
            .await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_MESSAGES_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&anthropic.server)
            .await;

        let manager = manager(&openai, &anthropic, true);
        for _ in 0..2 {
            let response = manager.chat(hello(), &RequestContext::new()).await.unwrap();
            response.assert_served_by("openai");
            response.assert_has_usage();
            assert_eq!(response.metadata.attempts, 1);
            assert!(!response.metadata.used_fallback);
        }

        let usage = manager.get_cost_tracker().get_provider_usage("openai");
        assert_eq!(usage.total_requests, 2);
        assert_eq!(usage.total_tokens, 240);
        crate::assert_approx_eq!(usage.total_cost, 2.0 * (100.0 * 0.15 + 20.0 * 0.6) / 1e6);

        let health = manager.get_provider_health("openai").unwrap();
        assert!(health.is_healthy);
        assert_eq!(health.requests_last_24h, 2);
        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_retries_then_falls_back() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(openai_error_body("overloaded", "server_error", None)),
            )
            .expect(3)
            .mount(&openai.server)
            .await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_MESSAGES_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(anthropic_message_body("Hello!", 10, 2)),
            )
            .expect(1)
            .mount(&anthropic.server)
            .await;

        let manager = manager(&openai, &anthropic, true);
        let response = manager.chat(hello(), &RequestContext::new()).await.unwrap();

        response.assert_served_by("anthropic");
        assert_eq!(response.content, "Hello!");
        assert_eq!(response.metadata.attempts, 4);
        assert!(response.metadata.used_fallback);
        assert_eq!(response.metadata.providers_tried, vec!["openai", "anthropic"]);

        let openai_health = manager.get_provider_health("openai").unwrap();
        assert_eq!(openai_health.health_check_failures, 1);
        assert!(openai_health.is_healthy);
        assert_eq!(
            manager.get_cost_tracker().get_provider_usage("openai").total_requests,
            0
        );
        assert_eq!(
            manager.get_cost_tracker().get_provider_usage("anthropic").total_requests,
            1
        );
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_not_retried() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_CHAT_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(openai_error_body(
                "Incorrect API key",
                "invalid_request_error",
                Some("invalid_api_key"),
            )))
            .expect(1)
            .mount(&openai.server)
            .await;

        let manager = manager(&openai, &anthropic, false);
        let err = manager.chat(hello(), &RequestContext::new()).await.unwrap_err();
        let (attempted, cause) = expect_all_failed(err);

        assert_eq!(attempted, vec!["openai"]);
        assert!(matches!(cause, ProviderError::Authentication { .. }));
    }

    #[tokio::test]
    async fn test_every_provider_failing() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        openai
            .respond_with(500, openai_error_body("boom", "server_error", None))
            .await;
        anthropic
            .respond_with(401, anthropic_error_body("authentication_error", "bad key"))
            .await;

        let manager = manager(&openai, &anthropic, true);
        let err = manager.chat(hello(), &RequestContext::new()).await.unwrap_err();
        assert_eq!(err.error_type(), "all_providers_failed");
        let (attempted, cause) = expect_all_failed(err);

        assert_eq!(attempted, vec!["openai", "anthropic"]);
        assert!(matches!(cause, ProviderError::Authentication { .. }));
        assert_eq!(manager.get_cost_tracker().total_requests(), 0);
    }

    #[tokio::test]
    async fn test_repeated_failures_take_provider_out_of_rotation() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_CHAT_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(openai_error_body(
                "bad request",
                "invalid_request_error",
                None,
            )))
            .expect(3)
            .mount(&openai.server)
            .await;
        anthropic
            .respond_with(200, anthropic_message_body("fine", 5, 1))
            .await;

        let manager = manager(&openai, &anthropic, true);
        for _ in 0..3 {
            let response = manager.chat(hello(), &RequestContext::new()).await.unwrap();
            response.assert_served_by("anthropic");
        }
        assert_eq!(manager.available_providers(), vec!["anthropic"]);

        // Skipped without a request reaching the upstream
        let response = manager.chat(hello(), &RequestContext::new()).await.unwrap();
        assert_eq!(response.metadata.providers_tried, vec!["anthropic"]);
        assert_eq!(response.metadata.attempts, 1);
    }

    #[tokio::test]
    async fn test_probe_restores_provider() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        openai
            .respond_with(500, openai_error_body("down", "server_error", None))
            .await;
        anthropic
            .respond_with(200, anthropic_message_body("fine", 5, 1))
            .await;

        let manager = manager(&openai, &anthropic, true);
        for _ in 0..3 {
            manager.chat(hello(), &RequestContext::new()).await.unwrap();
        }
        assert!(!manager.get_provider_health("openai").unwrap().is_healthy);

        openai.server.reset().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&openai.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&anthropic.server)
            .await;

        manager.probe_health_now().await;

        let health = manager.get_provider_health("openai").unwrap();
        assert!(health.is_healthy);
        assert_eq!(health.health_check_failures, 0);
        assert_eq!(manager.available_providers(), vec!["anthropic", "openai"]);
    }

    #[tokio::test]
    async fn test_stream_falls_back_after_failed_stream() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        openai.stream_with(openai_sse(&["lost"], false)).await;
        anthropic.stream_with(anthropic_sse(&["Hi", " there"], true)).await;

        let manager = manager(&openai, &anthropic, true);
        let (sender, mut receiver) = mpsc::channel(32);
        let summary = manager
            .chat_stream(hello(), &RequestContext::new(), sender)
            .await
            .unwrap();

        let mut elements = Vec::new();
        while let Some(element) = receiver.recv().await {
            elements.push(element);
        }
        let (content, terminals) = split_stream(&elements);

        assert_eq!(content, "lostHi there");
        assert_eq!(terminals.len(), 2);
        assert!(terminals[0].is_error());
        assert_eq!(terminals[0].provider, "openai");
        assert!(!terminals[1].is_error());
        assert_eq!(summary.provider, "anthropic");
        assert!(summary.metadata.used_fallback);
        assert_eq!(
            manager.get_cost_tracker().get_provider_usage("anthropic").total_requests,
            1
        );
    }

    #[tokio::test]
    async fn test_from_config_points_at_mocks() {
        let openai = MockOpenAI::start().await;
        let anthropic = MockAnthropic::start().await;
        anthropic
            .respond_with(200, anthropic_message_body("from config", 3, 3))
            .await;

        let mut config = GatewayConfig::default();
        config.manager = fast_manager_config().with_default_provider("anthropic");
        config.openai = Some(openai.config());
        config.anthropic = Some(anthropic.config());

        let manager = Manager::from_config(config).unwrap();
        assert_eq!(manager.provider_names(), vec!["anthropic", "openai"]);

        let response = manager.chat(hello(), &RequestContext::new()).await.unwrap();
        response.assert_served_by("anthropic");
        assert_eq!(response.content, "from config");
    }

    #[tokio::test]
    async fn test_from_config_rejects_missing_default() {
        let openai = MockOpenAI::start().await;
        let mut config = GatewayConfig::default();
        config.manager = fast_manager_config().with_default_provider("anthropic");
        config.openai = Some(openai.config());

        let err = Manager::from_config(config).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
