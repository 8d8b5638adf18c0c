//! Which language model backs the weather oracle

/// A model backend. Hosted backends need an API key, the local one does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    Ollama,
    OpenAI,
}

impl Provider {
    /// Name used in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Ollama => "ollama",
            Provider::OpenAI => "openai",
        }
    }

    /// Accepts the config name plus the vendor or product name people tend to type
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Provider::Gemini),
            "ollama" | "local" => Some(Provider::Ollama),
            "openai" | "chatgpt" => Some(Provider::OpenAI),
            _ => None,
        }
    }

    /// Environment variable holding the API key, if the backend needs one
    pub fn key_env_var(&self) -> Option<&'static str> {
        match self {
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Ollama => None,
        }
    }

    /// Short label for the header badge
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::Ollama => "Ollama · local",
            Provider::OpenAI => "OpenAI",
        }
    }
}
