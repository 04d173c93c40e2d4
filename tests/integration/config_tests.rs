//! Environment loading and validation

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;

    use llm_gateway::config::LogFormat;
    use llm_gateway::{GatewayConfig, GatewayError};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_full_environment() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("ANTHROPIC_MODEL", "claude-3-5-sonnet-20241022"),
            ("AI_DEFAULT_PROVIDER", "anthropic"),
            ("AI_RETRY_BACKOFF_MS", "250"),
            ("AI_DEFAULT_TIMEOUT_SECS", "20"),
            ("AI_ENABLE_HEALTH_CHECKS", "false"),
            ("GATEWAY_LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.manager.default_provider, "anthropic");
        assert_eq!(config.manager.retry_backoff, Duration::from_millis(250));
        assert!(!config.manager.enable_health_checks);
        assert_eq!(config.logging.format, LogFormat::Json);

        let openai = config.openai.unwrap();
        assert_eq!(openai.base_url, "http://localhost:8080/v1");
        assert_eq!(openai.timeout_secs, 20);
        let anthropic = config.anthropic.unwrap();
        assert_eq!(anthropic.model, "claude-3-5-sonnet-20241022");
        assert_eq!(anthropic.timeout_secs, 20);
    }

    #[test]
    fn test_invalid_environment_is_rejected() {
        let cases: &[&[(&str, &str)]] = &[
            &[],
            &[("OPENAI_API_KEY", "sk-test"), ("AI_MAX_RETRIES", "11")],
            &[("OPENAI_API_KEY", "sk-test"), ("AI_MAX_RETRIES", "three")],
            &[("OPENAI_API_KEY", "sk-test"), ("AI_ENABLE_FALLBACK", "maybe")],
            &[("OPENAI_API_KEY", "sk-test"), ("AI_DEFAULT_PROVIDER", "anthropic")],
            &[("OPENAI_API_KEY", "sk-test"), ("OPENAI_BASE_URL", "not a url")],
            &[("OPENAI_API_KEY", "sk-test"), ("GATEWAY_LOG_FORMAT", "xml")],
        ];

        for vars in cases {
            let err = GatewayConfig::from_lookup(lookup(vars)).unwrap_err();
            assert!(matches!(err, GatewayError::Config(_)), "{vars:?}");
        }
    }

    #[test]
    fn test_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# gateway settings").unwrap();
        writeln!(file, "LLM_GATEWAY_TEST_UNUSED=1").unwrap();
        writeln!(file, "OPENAI_API_KEY=sk-from-file").unwrap();
        writeln!(file, "AI_HEALTH_CHECK_INTERVAL_SECS=45").unwrap();
        file.flush().unwrap();

        let config = GatewayConfig::from_env_file(file.path()).unwrap();

        assert!(config.openai.is_some());
        assert_eq!(
            config.manager.health_check_interval,
            Duration::from_secs(45)
        );
        assert!(std::env::var("LLM_GATEWAY_TEST_UNUSED").is_err());
    }

    #[test]
    fn test_missing_env_file() {
        let err = GatewayConfig::from_env_file("/nonexistent/llm-gateway/.env").unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_config_serializes() {
        let config = GatewayConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        let value = serde_json::to_value(&config.manager).unwrap();
        assert_eq!(value["default_provider"], "openai");
        assert_eq!(value["retry_backoff"], 1000);
    }
}
