//! Anthropicプロバイダー実装
//!
//! Messages API (`POST {base_url}/messages`)

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

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropicプロバイダー
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    /// 新しいAnthropicプロバイダーを作成
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        config.validate()?;
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.config.base_url.trim_end_matches('/'))
    }

    /// The system instruction goes in the top-level `system` field, not in
    /// `messages`.
    fn build_body<'a>(&'a self, request: &'a LlmRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            system: request.system_prompt(),
            messages: request.conversation().collect(),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: &LlmRequest) -> LlmResult<String> {
        let api_key = self.config.get_api_key().ok_or_else(|| {
            LlmError::NotConfigured("Anthropic API key is not set".to_string())
        })?;

        debug!(model = %self.config.model, "sending Anthropic message");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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

        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        let content = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse("Anthropic".to_string()));
        }

        Ok(content)
    }

    fn is_available(&self) -> bool {
        self.config.is_configured()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<&'a Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_provider_creation() {
        let provider = AnthropicProvider::new(ProviderConfig::anthropic("test-key")).unwrap();
        assert!(provider.is_available());
        assert_eq!(provider.kind(), ProviderKind::Anthropic);
        assert_eq!(provider.endpoint(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_system_prompt_moved_out_of_messages() {
        let provider = AnthropicProvider::new(ProviderConfig::anthropic("k")).unwrap();
        let request = LlmRequest::with_system("be concise", "what happened?");
        let body = serde_json::to_value(provider.build_body(&request)).unwrap();

        assert_eq!(body["system"], "be concise");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["max_tokens"], 200);
    }
}
