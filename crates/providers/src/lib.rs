//! LLM provider implementations for NoHandCoder.
//!
//! All providers implement the `nohandcoder_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use nohandcoder_config::AppConfig;
use nohandcoder_core::error::ProviderError;

/// Build the configured provider.
pub fn build_from_config(config: &AppConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key; set OPENAI_API_KEY or api_key in config.toml".into(),
        )
    })?;
    Ok(OpenAiCompatProvider::new("openai", &config.api_url, api_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nohandcoder_core::Provider;

    #[test]
    fn missing_key_is_not_configured() {
        let err = build_from_config(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn builds_with_configured_url() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            api_url: "http://localhost:11434/v1/".into(),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.base_url(), "http://localhost:11434/v1");
    }
}
