use std::fmt;

use aiwire_core::{Error, GenerativeModel, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_client, ensure_success, require_api_key, resolve_base_url};
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::Inference("DeepSeek returned an empty completion".to_string()))
    }
}

/// DeepSeek's OpenAI-compatible chat completion endpoint.
pub struct DeepSeekModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for DeepSeekModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl DeepSeekModel {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout)?,
            api_key: require_api_key(config)?,
            base_url: resolve_base_url(config.base_url.as_deref(), DEFAULT_BASE_URL)?,
            model: config
                .model_name
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl GenerativeModel for DeepSeekModel {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        ensure_success(self.name(), response)
            .await?
            .json::<ChatResponse>()
            .await?
            .into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Provider;
    use serde_json::json;

    #[test]
    fn test_model_requires_api_key() {
        let result = DeepSeekModel::new(&Config::new(Provider::DeepSeek));
        assert!(result.is_err());

        let model = DeepSeekModel::new(&Config::new(Provider::DeepSeek).with_api_key("test-key")).unwrap();
        assert_eq!(model.model, DEFAULT_MODEL);
        assert_eq!(model.base_url, DEFAULT_BASE_URL);
        assert!(!format!("{:?}", model).contains("test-key"));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "deepseek-chat",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"model": "deepseek-chat", "messages": [{"role": "user", "content": "hello"}]})
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "x",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"a\":\"b\"}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"a\":\"b\"}");
    }

    #[test]
    fn test_empty_completion_is_an_error() {
        let no_choices: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(no_choices.into_text().is_err());

        let null_content: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(null_content.into_text().is_err());
    }
}
