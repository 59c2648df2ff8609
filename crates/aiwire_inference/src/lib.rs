use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use aiwire_core::{Error, Result};

pub mod engine;
pub mod extract;
pub mod models;
pub mod prompt;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Which generative backend answers the analysis prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    Gemini,
    Dummy,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek",
            Provider::Gemini => "gemini",
            Provider::Dummy => "dummy",
        }
    }

    /// Environment variable conventionally holding this backend's key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::Dummy => None,
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Provider::DeepSeek),
            "gemini" => Ok(Provider::Gemini),
            "dummy" => Ok(Provider::Dummy),
            other => Err(Error::Config(format!(
                "unknown model '{}', expected one of: deepseek, gemini, dummy",
                other
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Overrides the provider's default model identifier.
    pub model_name: Option<String>,
    /// Overrides the provider's default API root.
    pub base_url: Option<String>,
    /// Transport timeout for a single backend call.
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::DeepSeek,
            api_key: None,
            model_name: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

pub mod prelude {
    pub use super::engine::{AnalysisEngine, AnalysisFailure, AnalysisOutcome};
    pub use super::models::create_model;
    pub use super::prompt::{Prompt, PromptBuilder};
    pub use super::{Config, Provider};
    pub use aiwire_core::{AnalysisResult, ArticleRecord, Error, GenerativeModel, Result};
}

pub use engine::{AnalysisEngine, AnalysisFailure, AnalysisOutcome};
pub use models::create_model;
pub use prompt::{Prompt, PromptBuilder};
