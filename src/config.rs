/*!
Configuration for the digest run.

Two sources, kept separate on purpose:
- `AiConfig`: tunable model selection, loaded from a TOML file with hardcoded
  defaults when the file is missing or unparseable (a bad config file must not
  stop the daily run).
- `Credentials`: secrets from the environment. The mandatory ones abort startup
  before any network activity when absent.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// AI model selection and generation parameters (`[ai]` section of config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub model: String,
    #[serde(default)]
    pub fallback_models: Vec<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            fallback_models: vec![
                "llama-3.1-70b-versatile".to_string(),
                "mixtral-8x7b-32768".to_string(),
            ],
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    ai: AiConfig,
}

impl AiConfig {
    /// Load the `[ai]` section from a TOML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("failed to read config file: {}", path.as_ref().display()))?;
        let file: ConfigFile = toml::from_str(&data).context("failed to parse TOML configuration")?;
        Ok(file.ai)
    }

    /// Load from `path`, falling back to the built-in defaults on any error.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path.as_ref()).await {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), %e, "could not load config, using defaults");
                Self::default()
            }
        }
    }

    /// Primary model followed by the fallbacks, in attempt order.
    pub fn models(&self) -> Vec<String> {
        let mut models = Vec::with_capacity(1 + self.fallback_models.len());
        models.push(self.model.clone());
        models.extend(self.fallback_models.iter().cloned());
        models
    }
}

/// Environment-supplied secrets. Mandatory ones are checked before any work
/// begins so a misconfigured scheduler job fails fast with a clear message.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub groq_api_key: String,
    /// Optional bearer token for the advisory API (higher rate limits).
    pub github_token: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            notion_api_key: require_env("NOTION_API_KEY")?,
            notion_database_id: require_env("NOTION_DATABASE_ID")?,
            groq_api_key: require_env("GROQ_API_KEY")?,
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{} environment variable not set", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_known_models() {
        let cfg = AiConfig::default();
        assert_eq!(cfg.model, "llama-3.3-70b-versatile");
        assert_eq!(cfg.fallback_models.len(), 2);
        assert_eq!(cfg.temperature, 0.3);
        assert_eq!(cfg.max_tokens, 2000);
    }

    #[test]
    fn models_preserves_declared_order() {
        let cfg = AiConfig {
            model: "primary".into(),
            fallback_models: vec!["second".into(), "third".into()],
            temperature: 0.3,
            max_tokens: 100,
        };
        assert_eq!(cfg.models(), vec!["primary", "second", "third"]);
    }

    #[test]
    fn parses_ai_section() {
        let toml = r#"
            [ai]
            model = "llama-3.3-70b-versatile"
            fallback_models = ["mixtral-8x7b-32768"]
            temperature = 0.5
        "#;
        let file: ConfigFile = toml::from_str(toml).expect("parse");
        assert_eq!(file.ai.fallback_models, vec!["mixtral-8x7b-32768"]);
        assert_eq!(file.ai.temperature, 0.5);
        // defaulted when absent
        assert_eq!(file.ai.max_tokens, 2000);
    }
}
