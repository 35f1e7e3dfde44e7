use serde::{Deserialize, Serialize};

/// Configuration for the LLM-backed content provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible API endpoint (e.g. http://localhost:11434/v1 for Ollama)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (can be empty for local models)
    #[serde(default)]
    pub api_key: String,

    /// Model name (e.g. "llama3.2", "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for persona replies
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion length cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_api_url() -> String {
    "http://127.0.0.1:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ProviderConfig::from_toml("model = \"gpt-4o-mini\"").unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_url, default_api_url());
        assert!(config.api_key.is_empty());
        assert_eq!(config.max_tokens, 512);
    }
}
