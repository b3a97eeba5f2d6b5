//! Chat-assistant provider configuration.
//!
//! Resolves which language-model provider the dashboard's assistant talks
//! to, with which model and key. No request is ever sent from here; the
//! resolved [`AssistantConfig`] is handed to whatever client the caller
//! plugs in. A missing key is a hard error: there is no safe default.

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

pub const PROVIDER_VAR: &str = "MPULSE_AI_PROVIDER";
pub const MODEL_VAR: &str = "MPULSE_AI_MODEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantProvider {
    Gemini,
    OpenAi,
    Groq,
    HuggingFace,
    #[default]
    OpenRouter,
}

impl AssistantProvider {
    pub const ALL: [AssistantProvider; 5] = [
        AssistantProvider::Gemini,
        AssistantProvider::OpenAi,
        AssistantProvider::Groq,
        AssistantProvider::HuggingFace,
        AssistantProvider::OpenRouter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssistantProvider::Gemini => "gemini",
            AssistantProvider::OpenAi => "openai",
            AssistantProvider::Groq => "groq",
            AssistantProvider::HuggingFace => "huggingface",
            AssistantProvider::OpenRouter => "openrouter",
        }
    }

    /// Case-insensitive match on [`AssistantProvider::name`].
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }

    pub fn key_variable(self) -> &'static str {
        match self {
            AssistantProvider::Gemini => "MPULSE_GEMINI_API_KEY",
            AssistantProvider::OpenAi => "MPULSE_OPENAI_API_KEY",
            AssistantProvider::Groq => "MPULSE_GROQ_API_KEY",
            AssistantProvider::HuggingFace => "MPULSE_HUGGINGFACE_API_KEY",
            AssistantProvider::OpenRouter => "MPULSE_OPENROUTER_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            AssistantProvider::Gemini => "gemini-1.5-flash-latest",
            AssistantProvider::OpenAi => "gpt-3.5-turbo",
            AssistantProvider::Groq => "llama-3.3-70b-versatile",
            AssistantProvider::HuggingFace => "microsoft/DialoGPT-large",
            AssistantProvider::OpenRouter => "meta-llama/llama-3.3-70b-instruct",
        }
    }

    /// Request URL for `model`. Gemini and Hugging Face address the model
    /// in the path; the rest take it in the request body.
    pub fn endpoint(self, model: &str) -> String {
        match self {
            AssistantProvider::Gemini => format!(
                "https://generativelanguage.googleapis.com/v1/models/{model}:generateContent"
            ),
            AssistantProvider::OpenAi => "https://api.openai.com/v1/chat/completions".to_string(),
            AssistantProvider::Groq => {
                "https://api.groq.com/openai/v1/chat/completions".to_string()
            }
            AssistantProvider::HuggingFace => {
                format!("https://api-inference.huggingface.co/models/{model}")
            }
            AssistantProvider::OpenRouter => {
                "https://openrouter.ai/api/v1/chat/completions".to_string()
            }
        }
    }
}

impl fmt::Display for AssistantProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub provider: AssistantProvider,
    pub model: String,
    pub endpoint: String,
    api_key: String,
}

// Keep the key out of logs.
impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AssistantConfig {
    /// Resolve from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider = match get(PROVIDER_VAR) {
            Some(name) => AssistantProvider::parse(&name)?,
            None => AssistantProvider::default(),
        };
        let api_key = get(provider.key_variable()).ok_or(ConfigError::MissingCredential {
            provider: provider.name(),
            variable: provider.key_variable(),
        })?;
        let model = get(MODEL_VAR).unwrap_or_else(|| provider.default_model().to_string());

        Ok(Self {
            provider,
            endpoint: provider.endpoint(&model),
            model,
            api_key,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
