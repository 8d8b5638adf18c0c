use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Result, anyhow};

use crate::ai::{GeminiClient, OllamaClient, OpenAIClient};
use crate::ai::ollama::OLLAMA_BASE_URL;
use crate::model::Language;
use crate::oracle::{ModelOracle, WeatherOracle};
use crate::provider::Provider;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_url: Option<String>,
    pub language: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Gemini.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("atmosphere").join("config.json"))
    }

    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::parse)
            .unwrap_or_default()
    }

    pub fn language(&self) -> Language {
        self.language
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default()
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = Some(language.code().to_string());
    }

    /// Environment first, then config. `API_KEY` is accepted for Gemini too.
    pub fn gemini_api_key(&self) -> Option<String> {
        env_key(Provider::Gemini.key_env_var())
            .or_else(|| env_key(Some("API_KEY")))
            .or_else(|| non_empty(self.gemini_api_key.clone()))
    }

    pub fn openai_api_key(&self) -> Option<String> {
        env_key(Provider::OpenAI.key_env_var())
            .or_else(|| non_empty(self.openai_api_key.clone()))
    }

    /// Where the pinned list and the log file live
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("atmosphere")))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Build the one oracle instance the session talks to.
    ///
    /// A missing API key is not fatal: the client then fails every call and
    /// the oracle falls back to its offline answers.
    pub fn build_oracle(&self) -> Arc<dyn WeatherOracle> {
        match self.provider() {
            Provider::Gemini => {
                let key = self.gemini_api_key().unwrap_or_else(|| {
                    tracing::warn!(env = ?Provider::Gemini.key_env_var(), "no Gemini API key configured");
                    String::new()
                });
                let mut client = GeminiClient::new(&key);
                if let Some(model) = &self.model {
                    client = client.with_model(model);
                }
                tracing::info!(model = client.model(), "using Gemini");
                Arc::new(ModelOracle::new(client))
            }
            Provider::Ollama => {
                let url = self.ollama_url.as_deref().unwrap_or(OLLAMA_BASE_URL);
                let mut client = OllamaClient::new(url);
                if let Some(model) = &self.model {
                    client = client.with_model(model);
                }
                tracing::info!(model = client.model(), url, "using Ollama");
                Arc::new(ModelOracle::new(client))
            }
            Provider::OpenAI => {
                let key = self.openai_api_key().unwrap_or_else(|| {
                    tracing::warn!(env = ?Provider::OpenAI.key_env_var(), "no OpenAI API key configured");
                    String::new()
                });
                let mut client = OpenAIClient::new(&key);
                if let Some(model) = &self.model {
                    client = client.with_model(model);
                }
                tracing::info!(model = client.model(), "using OpenAI");
                Arc::new(ModelOracle::new(client))
            }
        }
    }
}

/// An unset or empty variable counts as absent
fn env_key(name: Option<&str>) -> Option<String> {
    name.and_then(|name| std::env::var(name).ok())
        .filter(|k| !k.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Process environment is shared by every test thread
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEY_VARS: [&str; 3] = ["GEMINI_API_KEY", "API_KEY", "OPENAI_API_KEY"];

    /// Run `f` with exactly the given key variables set, restoring them afterwards
    fn with_env(vars: &[(&str, &str)], f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = KEY_VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        for k in KEY_VARS {
            std::env::remove_var(k);
        }
        for (k, v) in vars {
            std::env::set_var(k, v);
        }

        f();

        for (k, v) in saved {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        }
    }

    #[test]
    fn test_empty_gemini_var_falls_through_to_api_key() {
        with_env(&[("GEMINI_API_KEY", ""), ("API_KEY", "from-api-key")], || {
            assert_eq!(Config::new().gemini_api_key().as_deref(), Some("from-api-key"));
        });
    }

    #[test]
    fn test_environment_wins_over_config() {
        let config = Config {
            gemini_api_key: Some("from-config".to_string()),
            openai_api_key: Some("sk-config".to_string()),
            ..Config::new()
        };
        with_env(&[("GEMINI_API_KEY", "from-env"), ("API_KEY", "fallback"), ("OPENAI_API_KEY", "sk-env")], || {
            assert_eq!(config.gemini_api_key().as_deref(), Some("from-env"));
            assert_eq!(config.openai_api_key().as_deref(), Some("sk-env"));
        });
    }

    #[test]
    fn test_config_key_used_when_environment_is_blank() {
        let config = Config {
            gemini_api_key: Some("from-config".to_string()),
            openai_api_key: Some("sk-config".to_string()),
            ..Config::new()
        };
        with_env(&[("GEMINI_API_KEY", ""), ("API_KEY", ""), ("OPENAI_API_KEY", "")], || {
            assert_eq!(config.gemini_api_key().as_deref(), Some("from-config"));
            assert_eq!(config.openai_api_key().as_deref(), Some("sk-config"));
        });
    }

    #[test]
    fn test_no_key_anywhere_is_none() {
        let config = Config {
            gemini_api_key: Some(String::new()),
            ..Config::new()
        };
        with_env(&[], || {
            assert_eq!(config.gemini_api_key(), None);
            assert_eq!(config.openai_api_key(), None);
        });
    }

    #[test]
    fn test_set_language_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::new();
        config.set_language(Language::English);
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap().language(), Language::English);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.provider(), Provider::Gemini);
        assert_eq!(config.language(), Language::Chinese);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atmosphere").join("config.json");

        let config = Config {
            provider: Some("ollama".to_string()),
            model: Some("gemma3:latest".to_string()),
            language: Some("en".to_string()),
            data_dir: Some(dir.path().join("data")),
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider(), Provider::Ollama);
        assert_eq!(loaded.language(), Language::English);
        assert_eq!(loaded.model.as_deref(), Some("gemma3:latest"));
        assert_eq!(loaded.data_dir(), Some(dir.path().join("data")));
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let config = Config {
            provider: Some("claude".to_string()),
            language: Some("fr".to_string()),
            ..Config::new()
        };
        assert_eq!(config.provider(), Provider::Gemini);
        assert_eq!(config.language(), Language::Chinese);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
