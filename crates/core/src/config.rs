use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::types::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenAiConfig {
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub genai: Option<GenAiConfig>,
    #[serde(default)]
    pub default_language: Language,
}

impl AppConfig {
    /// Build configuration from well-known environment variables.
    ///
    /// Called once at process start; the result is handed to whatever needs
    /// it instead of living in a global.
    pub fn load_from_env() -> Result<Self> {
        preload_env_files();
        Self::from_lookup(|key| env_var_non_empty(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Blank values must
    /// already be filtered out by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let genai = match lookup("GENAI_API_KEY") {
            Some(api_key) => {
                let timeout_secs = match lookup("GENAI_TIMEOUT_SECS") {
                    Some(raw) => raw
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("GENAI_TIMEOUT_SECS is not a number: {raw}"))?,
                    None => default_timeout_secs(),
                };
                Some(GenAiConfig {
                    api_key,
                    endpoint: lookup("GENAI_ENDPOINT").unwrap_or_else(default_endpoint),
                    model: lookup("GENAI_MODEL").unwrap_or_else(default_model),
                    timeout_secs,
                })
            }
            None => None,
        };

        let default_language = match lookup("PREDICTPAL_DEFAULT_LANGUAGE") {
            Some(code) => code
                .parse::<Language>()
                .context("PREDICTPAL_DEFAULT_LANGUAGE must be `en` or `es`")?,
            None => Language::default(),
        };

        Ok(Self {
            genai,
            default_language,
        })
    }

    /// Helper that forces the presence of generative service configuration.
    pub fn require_genai_config(&self) -> Result<&GenAiConfig> {
        let config = self.genai.as_ref().context(
            "generative service not configured: create a .env file (see .env.example) and set GENAI_API_KEY",
        )?;

        ensure!(
            !config.api_key.trim().is_empty() && !config.endpoint.trim().is_empty(),
            "GENAI_API_KEY and GENAI_ENDPOINT must not be blank"
        );
        ensure!(config.timeout_secs > 0, "GENAI_TIMEOUT_SECS must be positive");

        Ok(config)
    }
}

fn env_var_non_empty(key: &str) -> Result<String, env::VarError> {
    let value = env::var(key)?;
    if value.trim().is_empty() {
        return Err(env::VarError::NotPresent);
    }
    Ok(value)
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn preload_env_files() {
    // .env in the working directory first, then the workspace root.
    let _ = dotenv();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidate_files = [manifest_dir.join("../../.env")];

    for path in candidate_files {
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_leaves_genai_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.genai.is_none());
        assert_eq!(config.default_language, Language::En);
        assert!(config.require_genai_config().is_err());
    }

    #[test]
    fn applies_defaults_when_only_key_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[("GENAI_API_KEY", "sk-test")])).unwrap();
        let genai = config.require_genai_config().unwrap();
        assert_eq!(genai.endpoint, "https://api.openai.com/v1");
        assert_eq!(genai.model, "gpt-4o-mini");
        assert_eq!(genai.timeout_secs, 60);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GENAI_API_KEY", "sk-test"),
            ("GENAI_ENDPOINT", "http://localhost:11434/v1"),
            ("GENAI_MODEL", "llama3"),
            ("GENAI_TIMEOUT_SECS", "15"),
            ("PREDICTPAL_DEFAULT_LANGUAGE", "ES"),
        ]))
        .unwrap();
        let genai = config.genai.as_ref().unwrap();
        assert_eq!(genai.endpoint, "http://localhost:11434/v1");
        assert_eq!(genai.model, "llama3");
        assert_eq!(genai.timeout_secs, 15);
        assert_eq!(config.default_language, Language::Es);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup_from(&[
            ("GENAI_API_KEY", "sk-test"),
            ("GENAI_TIMEOUT_SECS", "soon"),
        ]))
        .is_err());
        assert!(
            AppConfig::from_lookup(lookup_from(&[("PREDICTPAL_DEFAULT_LANGUAGE", "de")])).is_err()
        );
    }

    #[test]
    fn zero_timeout_is_rejected_on_require() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GENAI_API_KEY", "sk-test"),
            ("GENAI_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert!(config.require_genai_config().is_err());
    }
}
