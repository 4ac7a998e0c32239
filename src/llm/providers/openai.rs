//! OpenAIプロバイダー実装
//!
//! Chat Completions API (`POST {base_url}/chat/completions`)

use crate::llm::{
    config::{ProviderConfig, ProviderKind},
    error::{LlmError, LlmResult},
    providers::{build_http_client, truncate, LlmProvider},
    types::{LlmRequest, Message},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAIプロバイダー
pub struct OpenAIProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAIProvider {
    /// 新しいOpenAIプロバイダーを作成
    ///
    /// A config without an API key is accepted; the provider then reports
    /// itself unavailable.
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        config.validate()?;
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_body<'a>(&'a self, request: &'a LlmRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn complete(&self, request: &LlmRequest) -> LlmResult<String> {
        let api_key = self
            .config
            .get_api_key()
            .ok_or_else(|| LlmError::NotConfigured("OpenAI API key is not set".to_string()))?;

        debug!(model = %self.config.model, "sending OpenAI chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                body: truncate(&body, 320),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse("OpenAI".to_string()));
        }

        Ok(content)
    }

    fn is_available(&self) -> bool {
        self.config.is_configured()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }
}

/// チャット完了リクエスト
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

/// チャット完了レスポンス
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new(ProviderConfig::openai("test-key")).unwrap();
        assert!(provider.is_available());
        assert_eq!(provider.name(), "OpenAI");
    }

    #[test]
    fn test_provider_without_key_is_unavailable() {
        let provider =
            OpenAIProvider::new(ProviderConfig::new(ProviderKind::OpenAI, None)).unwrap();
        assert!(!provider.is_available());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = ProviderConfig::openai("k").with_base_url("http://localhost:9999/v1/");
        let provider = OpenAIProvider::new(config).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_request_body_uses_config_defaults() {
        let provider = OpenAIProvider::new(ProviderConfig::openai("k")).unwrap();
        let request = LlmRequest::with_system("sys", "prompt");
        let body = serde_json::to_value(provider.build_body(&request)).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "prompt");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_complete_without_key_fails_fast() {
        let provider =
            OpenAIProvider::new(ProviderConfig::new(ProviderKind::OpenAI, None)).unwrap();
        let result = provider
            .complete(&LlmRequest::with_system("sys", "prompt"))
            .await;
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));
    }
}
