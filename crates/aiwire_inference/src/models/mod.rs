use std::sync::Arc;
use std::time::Duration;

use aiwire_core::{Error, GenerativeModel, Result};
use reqwest::{Client, Response};
use tracing::info;
use url::Url;

use crate::{Config, Provider};

pub mod deepseek;
pub mod dummy;
pub mod gemini;

pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Longest slice of an error body quoted back in an error message.
const ERROR_BODY_CHARS: usize = 300;

/// Instantiate the backend named by `config.provider`.
///
/// Network backends fail here, before any article is processed, when their
/// API key is missing or the base URL does not parse.
pub fn create_model(config: &Config) -> Result<Arc<dyn GenerativeModel>> {
    let model: Arc<dyn GenerativeModel> = match config.provider {
        Provider::DeepSeek => Arc::new(DeepSeekModel::new(config)?),
        Provider::Gemini => Arc::new(GeminiModel::new(config)?),
        Provider::Dummy => Arc::new(DummyModel::new()),
    };
    info!("🧠 Inference model initialized (using {})", model.name());
    Ok(model)
}

pub(crate) fn require_api_key(config: &Config) -> Result<String> {
    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            let hint = config
                .provider
                .api_key_env()
                .map(|env| format!(" (set {} or pass --api-key)", env))
                .unwrap_or_default();
            Error::Config(format!("{} API key is required{}", config.provider, hint))
        })
}

/// Validate a base URL and return it without a trailing slash.
pub(crate) fn resolve_base_url(configured: Option<&str>, default: &str) -> Result<String> {
    let raw = configured.unwrap_or(default);
    let parsed = Url::parse(raw)
        .map_err(|e| Error::Config(format!("invalid base URL '{}': {}", raw, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "base URL must be http or https, got '{}'",
            raw
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Turn a non-success response into an error carrying the status and a
/// slice of the body.
pub(crate) async fn ensure_success(backend: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(ERROR_BODY_CHARS).collect();
    Err(Error::Inference(format!(
        "{} returned {}: {}",
        backend,
        status,
        body.trim()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_backends_require_key() {
        for provider in [Provider::DeepSeek, Provider::Gemini] {
            let err = create_model(&Config::new(provider)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{:?}", err);
        }
        let err = create_model(&Config::new(Provider::DeepSeek).with_api_key("  ")).unwrap_err();
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
    }

    #[test]
    fn test_create_model_by_provider() {
        let dummy = create_model(&Config::new(Provider::Dummy)).unwrap();
        assert_eq!(dummy.name(), "Dummy");

        let deepseek = create_model(&Config::new(Provider::DeepSeek).with_api_key("k")).unwrap();
        assert_eq!(deepseek.name(), "DeepSeek");

        let gemini = create_model(&Config::new(Provider::Gemini).with_api_key("k")).unwrap();
        assert_eq!(gemini.name(), "Gemini");
    }

    #[test]
    fn test_resolve_base_url() {
        assert_eq!(
            resolve_base_url(Some("http://localhost:8080/v1/"), "https://x.example").unwrap(),
            "http://localhost:8080/v1"
        );
        assert_eq!(
            resolve_base_url(None, "https://x.example/v1").unwrap(),
            "https://x.example/v1"
        );
        assert!(resolve_base_url(Some("not a url"), "https://x.example").is_err());
        assert!(resolve_base_url(Some("ftp://x.example"), "https://x.example").is_err());
    }
}
