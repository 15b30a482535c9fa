#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMConfig, LLMProvider};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.catalog_path, PathBuf::from("data/crops.toml"));
        assert_eq!(config.prices_path, PathBuf::from("data/prices.toml"));
        assert_eq!(config.output_path, PathBuf::from("./greenhouse.plan"));
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "moonshot".parse::<LLMProvider>().unwrap(),
            LLMProvider::Moonshot
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::Moonshot.to_string(), "moonshot");
        assert_eq!(LLMProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(LLMProvider::Anthropic.to_string(), "anthropic");
        assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_llm_config_default() {
        let llm = LLMConfig::default();

        assert_eq!(llm.api_base_url, "https://api.openai.com/v1");
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.max_tokens, 2048);
        assert_eq!(llm.temperature, 0.4);
        assert_eq!(llm.retry_attempts, 3);
        assert_eq!(llm.retry_delay_ms, 500);
        assert_eq!(llm.retry_delay_cap_ms, 4000);
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("greenhouse.toml");

        let content = r#"
catalog_path = "tables/crops.toml"
prices_path = "tables/prices.toml"
output_path = "out"
verbose = true

[llm]
provider = "deepseek"
api_key = "test-key"
api_base_url = "https://api.deepseek.com"
model = "deepseek-chat"
max_tokens = 1024
temperature = 0.2
retry_attempts = 2
retry_delay_ms = 100
retry_delay_cap_ms = 800
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("tables/crops.toml"));
        assert_eq!(config.prices_path, PathBuf::from("tables/prices.toml"));
        assert_eq!(config.output_path, PathBuf::from("out"));
        assert!(config.verbose);
        assert_eq!(config.llm.provider, LLMProvider::DeepSeek);
        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.llm.retry_attempts, 2);
    }

    #[test]
    fn test_config_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(Config::from_file(&missing).is_err());
    }
}
